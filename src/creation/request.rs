//! Public entry points.
//!
//! Inputs are collected in a [`ProxyRequest`]. An input that was never set
//! is absent and fails with [`ProxyError::Argument`]; an explicitly empty
//! list is present. Absence is checked before any other work, in a fixed
//! order, so the reported argument is deterministic.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::behavior::Behavior;
use crate::creation::synthesizer::{synthesize_for_instance, synthesize_new_instance};
use crate::creation::{aggregate, attach, check_capability, CreationStage};
use crate::error::{ProxyError, Result};
use crate::proxy::{InterceptingProxy, ProxyGenerator, Target};
use crate::types::{InterfaceDescriptor, InterfaceSet, TypeDescriptor, Value};

/// Inputs for one proxy creation.
#[derive(Default)]
pub struct ProxyRequest {
    intercepted_type: Option<TypeDescriptor>,
    target: Option<Arc<dyn Target>>,
    behaviors: Option<Vec<Arc<dyn Behavior>>>,
    additional_interfaces: Option<InterfaceSet>,
    constructor_args: Option<Vec<Value>>,
}

impl ProxyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The contract the proxy must honor.
    pub fn intercepted_type(mut self, ty: TypeDescriptor) -> Self {
        self.intercepted_type = Some(ty);
        self
    }

    /// Instance to wrap. The proxy keeps only a weak link; the caller's
    /// `Arc` keeps the target alive.
    pub fn target<T: Target + 'static>(self, target: Arc<T>) -> Self {
        self.target_dyn(target)
    }

    pub fn target_dyn(mut self, target: Arc<dyn Target>) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the behavior list, replacing anything set before.
    pub fn behaviors<I>(mut self, behaviors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Behavior>>,
    {
        self.behaviors = Some(behaviors.into_iter().collect());
        self
    }

    /// Append one behavior; it runs inside every behavior added before it.
    pub fn behavior<B: Behavior + 'static>(mut self, behavior: B) -> Self {
        self.behaviors
            .get_or_insert_with(Vec::new)
            .push(Arc::new(behavior));
        self
    }

    /// Set the extra interfaces, replacing anything set before.
    pub fn additional_interfaces<I, D>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<InterfaceDescriptor>,
    {
        self.additional_interfaces = Some(interfaces.into_iter().map(Into::into).collect());
        self
    }

    pub fn additional_interface(mut self, interface: impl Into<InterfaceDescriptor>) -> Self {
        self.additional_interfaces
            .get_or_insert_with(InterfaceSet::new)
            .insert(interface.into());
        self
    }

    /// Constructor arguments for new-instance mode, passed through untouched.
    pub fn constructor_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constructor_args = Some(args.into_iter().map(Into::into).collect());
        self
    }
}

impl fmt::Debug for ProxyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRequest")
            .field("intercepted_type", &self.intercepted_type.as_ref().map(|t| t.name()))
            .field("target", &self.target.as_ref().map(|t| t.type_name()))
            .field(
                "behaviors",
                &self
                    .behaviors
                    .as_ref()
                    .map(|b| b.iter().map(|b| b.name()).collect::<Vec<_>>()),
            )
            .field("additional_interfaces", &self.additional_interfaces)
            .field("constructor_args", &self.constructor_args)
            .finish()
    }
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(ProxyError::Argument { name })
}

/// Create a proxy around an existing, caller-owned instance.
///
/// Argument order: `intercepted_type`, `target`, `behaviors`, `additional_interfaces`.
pub fn create_proxy_for_instance(
    generator: &dyn ProxyGenerator,
    request: ProxyRequest,
) -> Result<Box<dyn InterceptingProxy>> {
    let ProxyRequest {
        intercepted_type,
        target,
        behaviors,
        additional_interfaces,
        ..
    } = request;
    let ty = require(intercepted_type, "intercepted_type")?;
    let target = require(target, "target")?;
    let behaviors = require(behaviors, "behaviors")?;
    let extra = require(additional_interfaces, "additional_interfaces")?;

    let span = debug_span!("create_proxy", mode = "instance", type_name = ty.name());
    let _enter = span.enter();

    check_capability(generator, &ty)?;
    debug!(stage = ?CreationStage::CapabilityVerified);

    let required = aggregate(&behaviors, &extra)?;
    debug!(stage = ?CreationStage::InterfacesAggregated, interfaces = required.len());

    let mut proxy = synthesize_for_instance(generator, &ty, &target, &required, &extra)?;
    debug!(stage = ?CreationStage::Synthesized);

    attach(proxy.as_mut(), &behaviors)?;
    debug!(stage = ?CreationStage::BehaviorsAttached, behaviors = behaviors.len());
    Ok(proxy)
}

/// Create a proxy around a freshly constructed instance.
///
/// Argument order: `intercepted_type`, `behaviors`, `additional_interfaces`,
/// `constructor_args`. A target set on the request is ignored.
pub fn create_proxy_for_new_instance(
    generator: &dyn ProxyGenerator,
    request: ProxyRequest,
) -> Result<Box<dyn InterceptingProxy>> {
    let ProxyRequest {
        intercepted_type,
        behaviors,
        additional_interfaces,
        constructor_args,
        ..
    } = request;
    let ty = require(intercepted_type, "intercepted_type")?;
    let behaviors = require(behaviors, "behaviors")?;
    let extra = require(additional_interfaces, "additional_interfaces")?;
    let args = require(constructor_args, "constructor_args")?;

    let span = debug_span!("create_proxy", mode = "new_instance", type_name = ty.name());
    let _enter = span.enter();

    check_capability(generator, &ty)?;
    debug!(stage = ?CreationStage::CapabilityVerified);

    let required = aggregate(&behaviors, &extra)?;
    debug!(stage = ?CreationStage::InterfacesAggregated, interfaces = required.len());

    let mut proxy = synthesize_new_instance(generator, &ty, &required, &extra, &args)?;
    debug!(stage = ?CreationStage::Synthesized, args = args.len());

    attach(proxy.as_mut(), &behaviors)?;
    debug!(stage = ?CreationStage::BehaviorsAttached, behaviors = behaviors.len());
    Ok(proxy)
}
