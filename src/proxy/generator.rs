//! Registry-backed proxy generator.
//!
//! Types that should be constructible in new-instance mode are registered
//! up front with their constructors. Wrapping an existing target needs no
//! registration. Synthesized proxy types are cached by signature.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use sha3::{Digest, Sha3_256};
use tracing::trace;

use crate::config::{ConfigError, GeneratorConfig};
use crate::proxy::dynamic::DynamicProxy;
use crate::proxy::{
    ConstructibleType, ConstructionFailure, GeneratorError, InterceptingProxy, ProxyGenerator, Target,
};
use crate::types::{InterfaceDescriptor, InterfaceSet, TypeDescriptor, TypeKind, Value, ValueKind};

type Factory = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Target>, String> + Send + Sync>;

/// A constructor of a registered type.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ValueKind>,
    factory: Factory,
}

impl Constructor {
    /// Create a constructor taking arguments of the given kinds.
    pub fn new<F>(params: impl Into<Vec<ValueKind>>, factory: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn Target>, String> + Send + Sync + 'static,
    {
        Self {
            params: params.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Whether `args` match this constructor's parameter kinds exactly.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(p, a)| *p == a.kind())
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor").field("params", &self.params).finish()
    }
}

/// Signature of a proxy type: SHA3-256(type name || 0 || interface names, each 0-terminated).
///
/// Interfaces are hashed in set order, so equal sets give equal signatures.
pub fn proxy_signature(ty: &TypeDescriptor, interfaces: &InterfaceSet) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(ty.name().as_bytes());
    hasher.update([0u8]);
    for interface in interfaces {
        hasher.update(interface.name().as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().into()
}

/// A synthesized, constructible proxy type.
#[derive(Debug)]
pub struct ProxyType {
    ty: TypeDescriptor,
    interfaces: InterfaceSet,
    constructors: Arc<Vec<Constructor>>,
    signature: [u8; 32],
}

impl ProxyType {
    pub fn signature(&self) -> &[u8; 32] {
        &self.signature
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }
}

impl ConstructibleType for ProxyType {
    fn proxied_type(&self) -> &TypeDescriptor {
        &self.ty
    }

    fn interfaces(&self) -> &InterfaceSet {
        &self.interfaces
    }

    fn construct(&self, args: &[Value]) -> Result<Box<dyn InterceptingProxy>, ConstructionFailure> {
        let ctor = self
            .constructors
            .iter()
            .find(|c| c.accepts(args))
            .ok_or_else(|| ConstructionFailure::NoMatchingConstructor {
                type_name: self.ty.name().to_string(),
                arg_kinds: args.iter().map(Value::kind).collect(),
            })?;

        let instance = (ctor.factory)(args).map_err(|reason| ConstructionFailure::Factory {
            type_name: self.ty.name().to_string(),
            reason,
        })?;

        Ok(Box::new(DynamicProxy::owning(
            self.ty.clone(),
            self.interfaces.clone(),
            instance,
            self.signature,
        )))
    }
}

/// Proxy generator over trait objects.
pub struct DynamicProxyGenerator {
    config: GeneratorConfig,
    marker: InterfaceDescriptor,
    registrations: HashMap<String, Arc<Vec<Constructor>>>,
    cache: Mutex<HashMap<[u8; 32], Arc<ProxyType>>>,
}

impl DynamicProxyGenerator {
    pub fn new() -> Self {
        Self::build(GeneratorConfig::default())
    }

    /// Create a generator with `config`, rejecting a malformed proxy marker.
    pub fn with_config(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GeneratorConfig) -> Self {
        Self {
            marker: config.marker(),
            config,
            registrations: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register constructors for a type name. Replaces earlier registrations
    /// and evicts proxy types cached for that name.
    pub fn register(&mut self, type_name: impl Into<String>, constructors: Vec<Constructor>) -> &mut Self {
        let type_name = type_name.into();
        self.cache.get_mut().retain(|_, cached| cached.ty.name() != type_name);
        self.registrations.insert(type_name, Arc::new(constructors));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Number of cached proxy types.
    pub fn cached_types(&self) -> usize {
        self.cache.lock().len()
    }

    fn proxy_interfaces(&self, ty: &TypeDescriptor, required: &InterfaceSet) -> InterfaceSet {
        let mut interfaces = ty.contract().union(required);
        interfaces.insert(self.marker.clone());
        interfaces
    }
}

impl Default for DynamicProxyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyGenerator for DynamicProxyGenerator {
    fn can_intercept(&self, ty: &TypeDescriptor) -> bool {
        match ty.kind() {
            TypeKind::Value => false,
            TypeKind::Interface => !ty.is_sealed(),
            TypeKind::Class => !ty.is_sealed() && ty.has_overridable_members(),
        }
    }

    fn proxy_marker(&self) -> &InterfaceDescriptor {
        &self.marker
    }

    fn create_proxy(
        &self,
        ty: &TypeDescriptor,
        target: &Arc<dyn Target>,
        interfaces: &InterfaceSet,
    ) -> Result<Box<dyn InterceptingProxy>, GeneratorError> {
        if !self.can_intercept(ty) {
            return Err(GeneratorError::Unsupported(ty.name().to_string()));
        }
        if !target.is_assignable_to(ty) {
            return Err(GeneratorError::NotAssignable {
                target: target.type_name().to_string(),
                expected: ty.name().to_string(),
            });
        }

        let interfaces = self.proxy_interfaces(ty, interfaces);
        let signature = proxy_signature(ty, &interfaces);
        Ok(Box::new(DynamicProxy::wrapping(ty.clone(), interfaces, target, signature)))
    }

    fn create_proxy_type(
        &self,
        ty: &TypeDescriptor,
        interfaces: &InterfaceSet,
    ) -> Result<Arc<dyn ConstructibleType>, GeneratorError> {
        if !self.can_intercept(ty) {
            return Err(GeneratorError::Unsupported(ty.name().to_string()));
        }
        let constructors = self
            .registrations
            .get(ty.name())
            .cloned()
            .ok_or_else(|| GeneratorError::UnknownType(ty.name().to_string()))?;

        let interfaces = self.proxy_interfaces(ty, interfaces);
        let signature = proxy_signature(ty, &interfaces);

        let mut cache = self.cache.lock();
        if let Some(existing) = cache.get(&signature) {
            if existing.ty == *ty {
                trace!(type_name = ty.name(), signature = %existing.signature_hex(), "proxy type cache hit");
                return Ok(Arc::clone(existing) as Arc<dyn ConstructibleType>);
            }
        }

        let proxy_type = Arc::new(ProxyType {
            ty: ty.clone(),
            interfaces,
            constructors,
            signature,
        });
        trace!(type_name = ty.name(), signature = %proxy_type.signature_hex(), "proxy type synthesized");

        if self.config.cache_proxy_types && cache.len() < self.config.max_cached_types {
            cache.insert(signature, Arc::clone(&proxy_type));
        }
        Ok(proxy_type)
    }
}

impl fmt::Debug for DynamicProxyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProxyGenerator")
            .field("config", &self.config)
            .field("registered", &self.registrations.len())
            .field("cached_types", &self.cached_types())
            .finish()
    }
}
