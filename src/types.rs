//! Core types for proxy construction and call interception.
//!
//! Descriptors are plain data: they name a contract, they do not carry
//! behavior. Identity of an interface is its fully qualified name.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Descriptor of an interface a proxy can expose.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceDescriptor {
    /// Fully qualified name (e.g. `app.IDisposable` or `app::Disposable`)
    pub(crate) name: String,
}

impl InterfaceDescriptor {
    /// Create a descriptor from a fully qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Get the fully qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check the name is a usable identity.
    ///
    /// Segments are `[A-Za-z0-9_]+`, separated by `.` or `::`.
    pub fn is_well_formed(&self) -> bool {
        if self.name.is_empty() || self.name.trim() != self.name {
            return false;
        }
        self.name
            .split("::")
            .flat_map(|part| part.split('.'))
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for InterfaceDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for InterfaceDescriptor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Set of interface descriptors with deterministic iteration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceSet {
    inner: BTreeSet<InterfaceDescriptor>,
}

impl InterfaceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. Returns `false` if it was already present.
    pub fn insert(&mut self, interface: InterfaceDescriptor) -> bool {
        self.inner.insert(interface)
    }

    pub fn contains(&self, interface: &InterfaceDescriptor) -> bool {
        self.inner.contains(interface)
    }

    /// Check whether a descriptor with the given name is present.
    pub fn contains_name(&self, name: &str) -> bool {
        self.inner.iter().any(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterfaceDescriptor> {
        self.inner.iter()
    }

    pub fn is_superset(&self, other: &InterfaceSet) -> bool {
        self.inner.is_superset(&other.inner)
    }

    /// Union of two sets.
    pub fn union(&self, other: &InterfaceSet) -> InterfaceSet {
        self.inner.union(&other.inner).cloned().collect()
    }
}

impl FromIterator<InterfaceDescriptor> for InterfaceSet {
    fn from_iter<I: IntoIterator<Item = InterfaceDescriptor>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<InterfaceDescriptor> for InterfaceSet {
    fn extend<I: IntoIterator<Item = InterfaceDescriptor>>(&mut self, iter: I) {
        self.inner.extend(iter)
    }
}

impl IntoIterator for InterfaceSet {
    type Item = InterfaceDescriptor;
    type IntoIter = std::collections::btree_set::IntoIter<InterfaceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a InterfaceSet {
    type Item = &'a InterfaceDescriptor;
    type IntoIter = std::collections::btree_set::Iter<'a, InterfaceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Shape of an intercepted type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Pure contract, no implementation of its own.
    Interface,
    /// Implementation type with (possibly) overridable members.
    Class,
    /// Copied by value; cannot be proxied.
    Value,
}

/// A member of an intercepted type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    /// Interface the member belongs to; the type itself when `None`.
    #[serde(default)]
    pub interface: Option<InterfaceDescriptor>,
    /// Non-overridable members are never routed through behaviors.
    pub overridable: bool,
}

impl MemberDescriptor {
    pub fn overridable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: None,
            overridable: true,
        }
    }

    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: None,
            overridable: false,
        }
    }
}

/// The nominal contract a proxy must honor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    #[serde(default)]
    pub(crate) sealed: bool,
    #[serde(default)]
    pub(crate) members: Vec<MemberDescriptor>,
    /// Interfaces the type itself implements.
    #[serde(default)]
    pub(crate) interfaces: InterfaceSet,
}

impl TypeDescriptor {
    /// Describe an interface type. All its members are interceptable.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            sealed: false,
            members: Vec::new(),
            interfaces: InterfaceSet::new(),
        }
    }

    /// Describe a class type.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Class,
            ..Self::interface(name)
        }
    }

    /// Describe a value type.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Value,
            ..Self::interface(name)
        }
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn implementing(mut self, interface: impl Into<InterfaceDescriptor>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn interfaces(&self) -> &InterfaceSet {
        &self.interfaces
    }

    /// The type viewed as an interface descriptor.
    pub fn as_interface(&self) -> InterfaceDescriptor {
        InterfaceDescriptor::new(self.name.clone())
    }

    /// Whether any member can be overridden by a generated proxy.
    pub fn has_overridable_members(&self) -> bool {
        self.members.iter().any(|m| m.overridable)
    }

    /// Interfaces a proxy of this type inherits: the type's own shape
    /// plus every interface it implements.
    pub fn contract(&self) -> InterfaceSet {
        let mut set = self.interfaces.clone();
        set.insert(self.as_interface());
        set
    }

    /// Look up a member declared directly on this type.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| m.name == name && m.interface.is_none())
    }
}

/// Discriminant of a [`Value`], used for constructor matching.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Float,
    Str,
    List,
}

/// Dynamically typed argument or return value of an intercepted call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One intercepted call: which member of which interface, with what arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub interface: InterfaceDescriptor,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl MethodCall {
    pub fn new(interface: impl Into<InterfaceDescriptor>, method: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Argument kinds, in order.
    pub fn arg_kinds(&self) -> Vec<ValueKind> {
        self.args.iter().map(Value::kind).collect()
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.interface, self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}
