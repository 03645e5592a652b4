#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use intercept_proxy::behavior::{Behavior, Next};
use intercept_proxy::proxy::{
    ConstructibleType, Constructor, DynamicProxyGenerator, GeneratorError, MethodTable,
};
use intercept_proxy::types::ValueKind;
use intercept_proxy::{
    CallResult, InterceptingProxy, InterfaceDescriptor, InterfaceSet, MemberDescriptor, MethodCall,
    ProxyGenerator, Target, TypeDescriptor, Value,
};

pub const IGREETER: &str = "app.IGreeter";
pub const COUNTER: &str = "app.Counter";
pub const IDISPOSABLE: &str = "app.IDisposable";

pub fn greeter_type() -> TypeDescriptor {
    TypeDescriptor::interface(IGREETER)
}

pub fn greeter() -> Arc<MethodTable> {
    Arc::new(MethodTable::new("app.Greeter").method(IGREETER, "greet", |_| Ok(Value::from("hi"))))
}

pub fn greet() -> MethodCall {
    MethodCall::new(IGREETER, "greet")
}

pub fn counter_type() -> TypeDescriptor {
    TypeDescriptor::class(COUNTER).with_member(MemberDescriptor::overridable("increment"))
}

pub fn increment() -> MethodCall {
    MethodCall::new(COUNTER, "increment")
}

/// Counter whose state lives in the instance created by each constructor call.
pub fn counter_constructor() -> Constructor {
    Constructor::new([ValueKind::Int], |args: &[Value]| {
        let seed = args[0].as_int().ok_or("seed must be an integer")?;
        let state = Arc::new(AtomicI64::new(seed));
        let target = MethodTable::new(COUNTER).method(COUNTER, "increment", move |_| {
            Ok(Value::Int(state.fetch_add(1, Ordering::SeqCst) + 1))
        });
        Ok(Box::new(target) as Box<dyn Target>)
    })
}

pub fn generator() -> DynamicProxyGenerator {
    let mut generator = DynamicProxyGenerator::new();
    generator.register(COUNTER, vec![counter_constructor()]);
    generator
}

/// Uppercases string results.
pub struct Uppercase;

impl Behavior for Uppercase {
    fn name(&self) -> &str {
        "Uppercase"
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        let value = next.run(call)?;
        Ok(value.as_str().map(|s| Value::from(s.to_uppercase())).unwrap_or(value))
    }
}

/// Records enter/exit around the rest of the chain.
pub struct Traced {
    pub name: String,
    pub trace: Arc<Mutex<Vec<String>>>,
}

impl Traced {
    pub fn new(name: &str, trace: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            trace: Arc::clone(trace),
        }
    }
}

impl Behavior for Traced {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        self.trace.lock().unwrap().push(format!("{}-enter", self.name));
        let result = next.run(call);
        self.trace.lock().unwrap().push(format!("{}-exit", self.name));
        result
    }
}

/// Pass-through behavior requiring the given interfaces.
pub struct Requiring {
    pub name: &'static str,
    pub interfaces: Vec<&'static str>,
}

impl Behavior for Requiring {
    fn name(&self) -> &str {
        self.name
    }

    fn required_interfaces(&self) -> Vec<InterfaceDescriptor> {
        self.interfaces.iter().map(|i| InterfaceDescriptor::new(*i)).collect()
    }

    fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
        next.run(call)
    }
}

/// Generator wrapper that counts calls and can refuse every type.
pub struct CountingGenerator {
    pub inner: DynamicProxyGenerator,
    pub allow: bool,
    pub capability_checks: AtomicUsize,
    pub proxies: AtomicUsize,
    pub proxy_types: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(allow: bool) -> Self {
        Self {
            inner: generator(),
            allow,
            capability_checks: AtomicUsize::new(0),
            proxies: AtomicUsize::new(0),
            proxy_types: AtomicUsize::new(0),
        }
    }

    pub fn synthesis_calls(&self) -> usize {
        self.proxies.load(Ordering::SeqCst) + self.proxy_types.load(Ordering::SeqCst)
    }
}

impl ProxyGenerator for CountingGenerator {
    fn can_intercept(&self, ty: &TypeDescriptor) -> bool {
        self.capability_checks.fetch_add(1, Ordering::SeqCst);
        self.allow && self.inner.can_intercept(ty)
    }

    fn proxy_marker(&self) -> &InterfaceDescriptor {
        self.inner.proxy_marker()
    }

    fn create_proxy(
        &self,
        ty: &TypeDescriptor,
        target: &Arc<dyn Target>,
        interfaces: &InterfaceSet,
    ) -> Result<Box<dyn InterceptingProxy>, GeneratorError> {
        self.proxies.fetch_add(1, Ordering::SeqCst);
        self.inner.create_proxy(ty, target, interfaces)
    }

    fn create_proxy_type(
        &self,
        ty: &TypeDescriptor,
        interfaces: &InterfaceSet,
    ) -> Result<Arc<dyn ConstructibleType>, GeneratorError> {
        self.proxy_types.fetch_add(1, Ordering::SeqCst);
        self.inner.create_proxy_type(ty, interfaces)
    }
}

/// Generator that withholds some requested interfaces and adds others.
pub struct ReshapingGenerator {
    pub inner: DynamicProxyGenerator,
    pub withhold: Vec<&'static str>,
    pub inject: Vec<&'static str>,
}

impl ReshapingGenerator {
    pub fn new(withhold: Vec<&'static str>, inject: Vec<&'static str>) -> Self {
        Self {
            inner: generator(),
            withhold,
            inject,
        }
    }

    fn reshape(&self, interfaces: &InterfaceSet) -> InterfaceSet {
        interfaces
            .iter()
            .filter(|i| !self.withhold.iter().any(|w| *w == i.name()))
            .cloned()
            .chain(self.inject.iter().map(|i| InterfaceDescriptor::new(*i)))
            .collect()
    }
}

impl ProxyGenerator for ReshapingGenerator {
    fn can_intercept(&self, ty: &TypeDescriptor) -> bool {
        self.inner.can_intercept(ty)
    }

    fn proxy_marker(&self) -> &InterfaceDescriptor {
        self.inner.proxy_marker()
    }

    fn create_proxy(
        &self,
        ty: &TypeDescriptor,
        target: &Arc<dyn Target>,
        interfaces: &InterfaceSet,
    ) -> Result<Box<dyn InterceptingProxy>, GeneratorError> {
        self.inner.create_proxy(ty, target, &self.reshape(interfaces))
    }

    fn create_proxy_type(
        &self,
        ty: &TypeDescriptor,
        interfaces: &InterfaceSet,
    ) -> Result<Arc<dyn ConstructibleType>, GeneratorError> {
        self.inner.create_proxy_type(ty, &self.reshape(interfaces))
    }
}
