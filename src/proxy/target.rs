//! Table-driven target implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CallResult, InvocationError};
use crate::proxy::Target;
use crate::types::{InterfaceDescriptor, InterfaceSet, MethodCall};

type Handler = Arc<dyn Fn(&MethodCall) -> CallResult + Send + Sync>;

/// A [`Target`] whose methods are closures keyed by `(interface, method)`.
#[derive(Clone)]
pub struct MethodTable {
    type_name: String,
    interfaces: InterfaceSet,
    handlers: HashMap<(String, String), Handler>,
}

impl MethodTable {
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let mut interfaces = InterfaceSet::new();
        interfaces.insert(InterfaceDescriptor::new(type_name.clone()));
        Self {
            type_name,
            interfaces,
            handlers: HashMap::new(),
        }
    }

    /// Declare an interface this target implements.
    pub fn implementing(mut self, interface: impl Into<InterfaceDescriptor>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    /// Register a method. Its interface is implied as implemented.
    pub fn method<F>(mut self, interface: impl Into<InterfaceDescriptor>, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&MethodCall) -> CallResult + Send + Sync + 'static,
    {
        let interface = interface.into();
        self.handlers
            .insert((interface.name().to_string(), method.into()), Arc::new(handler));
        self.interfaces.insert(interface);
        self
    }
}

impl Target for MethodTable {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn implements(&self, interface: &InterfaceDescriptor) -> bool {
        self.interfaces.contains(interface)
    }

    fn call(&self, call: &MethodCall) -> CallResult {
        let key = (call.interface.name().to_string(), call.method.clone());
        match self.handlers.get(&key) {
            Some(handler) => (**handler)(call),
            None => Err(InvocationError::NotImplemented {
                interface: key.0,
                method: key.1,
            }),
        }
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.handlers.keys().collect();
        methods.sort();
        f.debug_struct("MethodTable")
            .field("type_name", &self.type_name)
            .field("interfaces", &self.interfaces)
            .field("methods", &methods)
            .finish()
    }
}
