//! Demo of both proxy creation modes.
//!
//! - Wrap an existing greeter, uppercasing its replies
//! - Construct two counters behind proxies that expose an extra interface
//!
//! Run with: cargo run --example greeter

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use intercept_proxy::behavior::stock::FnBehavior;
use intercept_proxy::proxy::{Constructor, DynamicProxyGenerator, MethodTable};
use intercept_proxy::types::ValueKind;
use intercept_proxy::{
    create_proxy_for_instance, create_proxy_for_new_instance, MemberDescriptor, MethodCall, Next, ProxyRequest,
    Target, TypeDescriptor, Value,
};

fn main() {
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              Intercept-Proxy: Behavior Chain Demo          ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    let mut generator = DynamicProxyGenerator::new();
    generator.register(
        "demo.Counter",
        vec![Constructor::new([ValueKind::Int], |args: &[Value]| {
            let seed = args[0].as_int().ok_or("seed must be an integer")?;
            let state = Arc::new(AtomicI64::new(seed));
            Ok(Box::new(MethodTable::new("demo.Counter").method("demo.Counter", "increment", move |_| {
                Ok(Value::Int(state.fetch_add(1, Ordering::SeqCst) + 1))
            })) as Box<dyn Target>)
        })],
    );

    // Step 1: wrap an existing instance
    println!("🔗 Step 1: Wrapping an existing greeter");
    let trace = Arc::new(Mutex::new(Vec::new()));
    let log = {
        let trace = Arc::clone(&trace);
        FnBehavior::new("log", move |call: &MethodCall, next: Next<'_>| {
            trace.lock().map(|mut t| t.push(format!("→ {}", call))).ok();
            let result = next.run(call);
            trace.lock().map(|mut t| t.push(format!("← {:?}", result))).ok();
            result
        })
    };
    let uppercase = FnBehavior::new("uppercase", |call: &MethodCall, next: Next<'_>| {
        let value = next.run(call)?;
        Ok(value.as_str().map(|s| Value::from(s.to_uppercase())).unwrap_or(value))
    });

    let greeter = Arc::new(MethodTable::new("demo.Greeter").method("demo.IGreeter", "greet", |call| {
        let name = call.args.first().and_then(Value::as_str).unwrap_or("world");
        Ok(Value::from(format!("hello, {}", name)))
    }));

    let proxy = match create_proxy_for_instance(
        &generator,
        ProxyRequest::new()
            .intercepted_type(TypeDescriptor::interface("demo.IGreeter"))
            .target(Arc::clone(&greeter))
            .behavior(log)
            .behavior(uppercase)
            .additional_interfaces(Vec::<&str>::new()),
    ) {
        Ok(proxy) => proxy,
        Err(err) => {
            println!("   ✗ {}", err);
            return;
        }
    };

    let reply = proxy.invoke(&MethodCall::new("demo.IGreeter", "greet").with_arg("ada"));
    println!("   ✓ Reply: {:?}", reply);
    for line in trace.lock().map(|t| t.clone()).unwrap_or_default() {
        println!("     {}", line);
    }
    println!();

    // Step 2: construct new instances
    println!("🏗  Step 2: Constructing counters behind proxies");
    let counter = TypeDescriptor::class("demo.Counter").with_member(MemberDescriptor::overridable("increment"));
    for seed in [10, 100] {
        let proxy = create_proxy_for_new_instance(
            &generator,
            ProxyRequest::new()
                .intercepted_type(counter.clone())
                .behaviors(Vec::new())
                .additional_interface("demo.IDisposable")
                .constructor_args([seed]),
        );
        match proxy {
            Ok(proxy) => {
                let increment = MethodCall::new("demo.Counter", "increment");
                let first = proxy.invoke(&increment);
                let second = proxy.invoke(&increment);
                let interfaces: Vec<&str> = proxy.implemented_interfaces().iter().map(|i| i.name()).collect();
                println!("   ✓ seed {}: {:?}, {:?}", seed, first, second);
                println!("     interfaces: {}", interfaces.join(", "));
            }
            Err(err) => println!("   ✗ seed {}: {}", seed, err),
        }
    }
    println!();

    // Step 3: a type the generator refuses
    println!("🚫 Step 3: Sealed types are refused up front");
    let sealed = create_proxy_for_new_instance(
        &generator,
        ProxyRequest::new()
            .intercepted_type(counter.sealed())
            .behaviors(Vec::new())
            .additional_interfaces(Vec::<&str>::new())
            .constructor_args([1]),
    );
    if let Err(err) = sealed {
        println!("   ✓ {}", err);
    }
}
