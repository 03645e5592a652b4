//! Proxy object produced by the dynamic generator.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::behavior::{Behavior, BehaviorPipeline};
use crate::error::{CallResult, InvocationError};
use crate::proxy::{InterceptingProxy, RegistrationError, Target};
use crate::types::{InterfaceSet, MethodCall, TypeDescriptor};

/// Where uninstrumented calls end up.
enum Delegate {
    /// Caller-owned target; the proxy only holds a non-owning link.
    Wrapped(Weak<dyn Target>),
    /// Instance created together with the proxy.
    Owned(Box<dyn Target>),
}

/// Intercepting proxy backed by a [`BehaviorPipeline`].
pub struct DynamicProxy {
    ty: TypeDescriptor,
    interfaces: InterfaceSet,
    pipeline: BehaviorPipeline,
    delegate: Delegate,
    signature: [u8; 32],
}

impl DynamicProxy {
    pub(crate) fn wrapping(
        ty: TypeDescriptor,
        interfaces: InterfaceSet,
        target: &Arc<dyn Target>,
        signature: [u8; 32],
    ) -> Self {
        Self {
            ty,
            interfaces,
            pipeline: BehaviorPipeline::new(),
            delegate: Delegate::Wrapped(Arc::downgrade(target)),
            signature,
        }
    }

    pub(crate) fn owning(
        ty: TypeDescriptor,
        interfaces: InterfaceSet,
        instance: Box<dyn Target>,
        signature: [u8; 32],
    ) -> Self {
        Self {
            ty,
            interfaces,
            pipeline: BehaviorPipeline::new(),
            delegate: Delegate::Owned(instance),
            signature,
        }
    }

    /// Signature of the proxy type this object was generated from.
    pub fn signature(&self) -> &[u8; 32] {
        &self.signature
    }

    /// Whether the proxy owns its target (new-instance mode).
    pub fn owns_target(&self) -> bool {
        matches!(self.delegate, Delegate::Owned(_))
    }

    fn bypasses_chain(&self, call: &MethodCall) -> bool {
        call.interface.name() == self.ty.name()
            && self.ty.member(&call.method).is_some_and(|m| !m.overridable)
    }

    fn dispatch(&self, call: &MethodCall) -> CallResult {
        match &self.delegate {
            Delegate::Owned(target) => self.call_target(target.as_ref(), call),
            Delegate::Wrapped(link) => {
                let target = link.upgrade().ok_or(InvocationError::TargetDropped)?;
                self.call_target(target.as_ref(), call)
            }
        }
    }

    fn call_target(&self, target: &dyn Target, call: &MethodCall) -> CallResult {
        if call.interface.name() == self.ty.name() || target.implements(&call.interface) {
            target.call(call)
        } else {
            Err(InvocationError::NotImplemented {
                interface: call.interface.name().to_string(),
                method: call.method.clone(),
            })
        }
    }
}

impl InterceptingProxy for DynamicProxy {
    fn intercepted_type(&self) -> &TypeDescriptor {
        &self.ty
    }

    fn implemented_interfaces(&self) -> &InterfaceSet {
        &self.interfaces
    }

    fn add_behavior(&mut self, behavior: Arc<dyn Behavior>) -> Result<(), RegistrationError> {
        if let Some(missing) = behavior
            .required_interfaces()
            .into_iter()
            .find(|i| !self.interfaces.contains(i))
        {
            return Err(RegistrationError::MissingInterface {
                interface: missing.name().to_string(),
            });
        }
        self.pipeline.add(behavior);
        Ok(())
    }

    fn behaviors(&self) -> &[Arc<dyn Behavior>] {
        self.pipeline.behaviors()
    }

    fn invoke(&self, call: &MethodCall) -> CallResult {
        if !self.interfaces.contains(&call.interface) {
            return Err(InvocationError::InterfaceNotImplemented {
                type_name: self.ty.name().to_string(),
                interface: call.interface.name().to_string(),
            });
        }
        if self.bypasses_chain(call) {
            return self.dispatch(call);
        }
        self.pipeline.invoke(call, |c| self.dispatch(c))
    }
}

impl fmt::Debug for DynamicProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProxy")
            .field("type", &self.ty.name())
            .field("interfaces", &self.interfaces)
            .field("behaviors", &self.pipeline)
            .field("owns_target", &self.owns_target())
            .finish()
    }
}
