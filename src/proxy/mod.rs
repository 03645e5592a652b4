//! Proxy generator boundary.
//!
//! How a proxy type is actually produced is opaque to the creation logic:
//! it only needs a [`ProxyGenerator`] that can answer whether a type is
//! interceptable, wrap an existing target, or synthesize a constructible
//! proxy type. [`DynamicProxyGenerator`] is a registry-backed
//! implementation built on trait objects.

pub mod dynamic;
pub mod generator;
pub mod target;

pub use dynamic::DynamicProxy;
pub use generator::{proxy_signature, Constructor, DynamicProxyGenerator, ProxyType};
pub use target::MethodTable;

use std::sync::Arc;

use thiserror::Error;

use crate::behavior::Behavior;
use crate::error::CallResult;
use crate::types::{InterfaceDescriptor, InterfaceSet, MethodCall, TypeDescriptor, Value, ValueKind};

/// A real implementation that a proxy delegates to.
pub trait Target: Send + Sync {
    /// Name of the concrete type.
    fn type_name(&self) -> &str;

    /// Whether the target implements `interface` itself.
    fn implements(&self, interface: &InterfaceDescriptor) -> bool;

    /// Execute the call for real.
    fn call(&self, call: &MethodCall) -> CallResult;

    /// Whether the target can stand in for `ty`.
    fn is_assignable_to(&self, ty: &TypeDescriptor) -> bool {
        self.type_name() == ty.name() || self.implements(&ty.as_interface())
    }
}

/// Capability shared by every generated proxy: it accepts behaviors.
pub trait InterceptingProxy: Send + Sync {
    /// The contract this proxy stands in for.
    fn intercepted_type(&self) -> &TypeDescriptor;

    /// Every interface the proxy exposes.
    fn implemented_interfaces(&self) -> &InterfaceSet;

    fn implements(&self, interface: &InterfaceDescriptor) -> bool {
        self.implemented_interfaces().contains(interface)
    }

    /// Append a behavior to the end (innermost position) of the chain.
    fn add_behavior(&mut self, behavior: Arc<dyn Behavior>) -> Result<(), RegistrationError>;

    /// Attached behaviors, outermost first.
    fn behaviors(&self) -> &[Arc<dyn Behavior>];

    /// Route a call through the chain to the target.
    fn invoke(&self, call: &MethodCall) -> CallResult;
}

/// A synthesized proxy type that still needs constructor arguments.
pub trait ConstructibleType: Send + Sync {
    fn proxied_type(&self) -> &TypeDescriptor;

    /// Interfaces every instance will expose.
    fn interfaces(&self) -> &InterfaceSet;

    /// Instantiate with the given arguments.
    fn construct(&self, args: &[Value]) -> Result<Box<dyn InterceptingProxy>, ConstructionFailure>;
}

/// Opaque proxy generation capability.
pub trait ProxyGenerator: Send + Sync {
    /// Whether a proxy can be produced for `ty` at all.
    fn can_intercept(&self, ty: &TypeDescriptor) -> bool;

    /// Capability interface every proxy from this generator exposes.
    fn proxy_marker(&self) -> &InterfaceDescriptor;

    /// Wrap an existing target.
    fn create_proxy(
        &self,
        ty: &TypeDescriptor,
        target: &Arc<dyn Target>,
        interfaces: &InterfaceSet,
    ) -> Result<Box<dyn InterceptingProxy>, GeneratorError>;

    /// Synthesize a proxy type for later construction.
    fn create_proxy_type(
        &self,
        ty: &TypeDescriptor,
        interfaces: &InterfaceSet,
    ) -> Result<Arc<dyn ConstructibleType>, GeneratorError>;
}

/// Errors reported by a proxy generator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Type {0} is not interceptable")]
    Unsupported(String),
    #[error("Target of type {target} is not assignable to {expected}")]
    NotAssignable { target: String, expected: String },
    #[error("Type {0} has no registration")]
    UnknownType(String),
    #[error("Generated proxy does not expose {missing:?}")]
    InterfacesDropped { missing: Vec<String> },
    #[error("Generated proxy exposes unrequested {leaked:?}")]
    InterfacesLeaked { leaked: Vec<String> },
    #[error("{0}")]
    Other(String),
}

/// Errors reported when instantiating a synthesized proxy type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionFailure {
    #[error("No constructor of {type_name} accepts {arg_kinds:?}")]
    NoMatchingConstructor {
        type_name: String,
        arg_kinds: Vec<ValueKind>,
    },
    #[error("Constructor of {type_name} failed: {reason}")]
    Factory { type_name: String, reason: String },
}

/// Errors reported by a proxy refusing a behavior.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("Behavior requires {interface}, which the proxy does not expose")]
    MissingInterface { interface: String },
    #[error("{0}")]
    Rejected(String),
}
