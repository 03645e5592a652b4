//! Behaviors and the ordered chain they run in.
//!
//! A behavior sees every intercepted call it applies to, together with a
//! [`Next`] continuation for the rest of the chain. The first behavior in a
//! pipeline is the outermost: it observes the call first and the result last.

#[cfg(feature = "stock-behaviors")]
pub mod stock;

use std::fmt;
use std::sync::Arc;

use crate::error::CallResult;
use crate::types::{InterfaceDescriptor, MethodCall};

/// A cross-cutting participant in the call chain.
pub trait Behavior: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    /// Interfaces the proxy must additionally expose for this behavior.
    fn required_interfaces(&self) -> Vec<InterfaceDescriptor> {
        Vec::new()
    }

    /// Whether this behavior takes part in the given call.
    ///
    /// Returning `false` skips the behavior for this call only.
    fn applies_to(&self, _call: &MethodCall) -> bool {
        true
    }

    /// Handle the call. Call `next.run(..)` to continue down the chain,
    /// or return directly to short-circuit it.
    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult;
}

/// Continuation to the rest of the chain, ending at the real target.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Behavior>],
    terminal: &'a (dyn Fn(&MethodCall) -> CallResult + 'a),
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        remaining: &'a [Arc<dyn Behavior>],
        terminal: &'a (dyn Fn(&MethodCall) -> CallResult + 'a),
    ) -> Self {
        Self { remaining, terminal }
    }

    /// Run the remaining chain with `call`.
    pub fn run(self, call: &MethodCall) -> CallResult {
        let mut rest = self.remaining;
        while let Some((head, tail)) = rest.split_first() {
            if head.applies_to(call) {
                return head.invoke(call, Next::new(tail, self.terminal));
            }
            rest = tail;
        }
        (self.terminal)(call)
    }

    /// Number of behaviors left before the target (applicable or not).
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

/// Ordered list of behaviors attached to a proxy.
#[derive(Clone, Default)]
pub struct BehaviorPipeline {
    behaviors: Vec<Arc<dyn Behavior>>,
}

impl BehaviorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a behavior. It becomes the innermost one.
    pub fn add(&mut self, behavior: Arc<dyn Behavior>) {
        self.behaviors.push(behavior);
    }

    /// Attached behaviors, outermost first.
    pub fn behaviors(&self) -> &[Arc<dyn Behavior>] {
        &self.behaviors
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Run `call` through every applicable behavior, then `terminal`.
    pub fn invoke<F>(&self, call: &MethodCall, terminal: F) -> CallResult
    where
        F: Fn(&MethodCall) -> CallResult,
    {
        Next::new(&self.behaviors, &terminal).run(call)
    }
}

impl fmt::Debug for BehaviorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.behaviors.iter().map(|b| b.name()))
            .finish()
    }
}
