//! Ready-made behaviors.
//!
//! None of these are applied automatically; callers pick them per proxy.

use std::collections::BTreeSet;

use tracing::{debug, debug_span};

use crate::behavior::{Behavior, Next};
use crate::error::CallResult;
use crate::types::{InterfaceDescriptor, MethodCall};

/// Behavior backed by a closure.
pub struct FnBehavior<F> {
    name: String,
    required: Vec<InterfaceDescriptor>,
    f: F,
}

impl<F> FnBehavior<F>
where
    F: Fn(&MethodCall, Next<'_>) -> CallResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            f,
        }
    }

    /// Declare an interface the proxy must expose for this behavior.
    pub fn requiring(mut self, interface: impl Into<InterfaceDescriptor>) -> Self {
        self.required.push(interface.into());
        self
    }
}

impl<F> Behavior for FnBehavior<F>
where
    F: Fn(&MethodCall, Next<'_>) -> CallResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn required_interfaces(&self) -> Vec<InterfaceDescriptor> {
        self.required.clone()
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        (self.f)(call, next)
    }
}

/// Emits a debug span around every call it sees.
#[derive(Clone, Debug)]
pub struct TracingBehavior {
    name: String,
}

impl TracingBehavior {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TracingBehavior {
    fn default() -> Self {
        Self::new("tracing")
    }
}

impl Behavior for TracingBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        let span = debug_span!("intercepted_call", behavior = %self.name, call = %call);
        let _enter = span.enter();
        debug!(remaining = next.remaining(), "call entered");
        let result = next.run(call);
        match &result {
            Ok(value) => debug!(result = %value, "call returned"),
            Err(err) => debug!(error = %err, "call failed"),
        }
        result
    }
}

/// Restricts a behavior to a fixed set of method names.
pub struct Scoped<B> {
    inner: B,
    methods: BTreeSet<String>,
}

impl<B: Behavior> Scoped<B> {
    pub fn new<I, S>(inner: B, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }
}

impl<B: Behavior> Behavior for Scoped<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn required_interfaces(&self) -> Vec<InterfaceDescriptor> {
        self.inner.required_interfaces()
    }

    fn applies_to(&self, call: &MethodCall) -> bool {
        self.methods.contains(&call.method) && self.inner.applies_to(call)
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        self.inner.invoke(call, next)
    }
}
