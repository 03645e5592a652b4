mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use intercept_proxy::proxy::{ConstructionFailure, Constructor, GeneratorError, MethodTable, RegistrationError};
use intercept_proxy::types::ValueKind;
use intercept_proxy::{
    create_proxy_for_instance, create_proxy_for_new_instance, CreationStage, InterfaceDescriptor,
    InvocationError, MethodCall, ProxyError, ProxyGenerator, ProxyRequest, Target, TypeDescriptor, Value,
};

fn instance_request() -> ProxyRequest {
    ProxyRequest::new()
        .intercepted_type(greeter_type())
        .target(greeter())
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new())
}

fn new_instance_request() -> ProxyRequest {
    ProxyRequest::new()
        .intercepted_type(counter_type())
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new())
        .constructor_args([5])
}

fn missing_argument(result: intercept_proxy::Result<Box<dyn intercept_proxy::InterceptingProxy>>) -> &'static str {
    match result {
        Err(ProxyError::Argument { name }) => name,
        Err(other) => panic!("expected argument error, got {other}"),
        Ok(_) => panic!("expected argument error, got a proxy"),
    }
}

#[test]
fn test_tc_1_1_wrap_instance_uppercase() {
    let generator = generator();
    let target = greeter();
    let proxy = create_proxy_for_instance(
        &generator,
        ProxyRequest::new()
            .intercepted_type(greeter_type())
            .target(Arc::clone(&target))
            .behavior(Uppercase)
            .additional_interfaces(Vec::<&str>::new()),
    )
    .unwrap();

    assert_eq!(proxy.invoke(&greet()), Ok(Value::from("HI")));
    assert!(proxy.implements(&InterfaceDescriptor::new(IGREETER)));
    assert!(proxy.implements(generator.proxy_marker()));
}

#[test]
fn test_tc_1_2_new_instance_exposes_extra_interface() {
    let generator = generator();
    let request = || {
        ProxyRequest::new()
            .intercepted_type(counter_type())
            .behaviors(Vec::new())
            .additional_interface(IDISPOSABLE)
            .constructor_args([10])
    };

    let first = create_proxy_for_new_instance(&generator, request()).unwrap();
    let second = create_proxy_for_new_instance(&generator, request()).unwrap();

    assert!(first.implements(&InterfaceDescriptor::new(IDISPOSABLE)));
    assert!(first.behaviors().is_empty());

    assert_eq!(first.invoke(&increment()), Ok(Value::Int(11)));
    assert_eq!(first.invoke(&increment()), Ok(Value::Int(12)));
    // Separate instance, separate state
    assert_eq!(second.invoke(&increment()), Ok(Value::Int(11)));
}

#[test]
fn test_tc_1_3_extra_interface_without_implementation() {
    let generator = generator();
    let proxy = create_proxy_for_new_instance(
        &generator,
        new_instance_request().additional_interface(IDISPOSABLE),
    )
    .unwrap();

    let dispose = MethodCall::new(IDISPOSABLE, "dispose");
    assert_eq!(
        proxy.invoke(&dispose),
        Err(InvocationError::NotImplemented {
            interface: IDISPOSABLE.to_string(),
            method: "dispose".to_string(),
        })
    );
}

#[test]
fn test_tc_1_4_interface_set_is_contract_plus_required_plus_marker() {
    let generator = generator();
    let proxy = create_proxy_for_instance(
        &generator,
        instance_request()
            .behavior(Requiring { name: "audit", interfaces: vec!["app.IAudited"] })
            .additional_interface(IDISPOSABLE),
    )
    .unwrap();

    let names: Vec<&str> = proxy.implemented_interfaces().iter().map(|i| i.name()).collect();
    assert_eq!(
        names,
        vec!["app.IAudited", IDISPOSABLE, IGREETER, "intercept.IInterceptingProxy"]
    );
}

#[test]
fn test_tc_2_1_missing_arguments_instance_mode() {
    let generator = CountingGenerator::new(true);

    let no_type = ProxyRequest::new()
        .target(greeter())
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new());
    assert_eq!(missing_argument(create_proxy_for_instance(&generator, no_type)), "intercepted_type");

    let no_target = ProxyRequest::new()
        .intercepted_type(greeter_type())
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new());
    assert_eq!(missing_argument(create_proxy_for_instance(&generator, no_target)), "target");

    let no_behaviors = ProxyRequest::new()
        .intercepted_type(greeter_type())
        .target(greeter())
        .additional_interfaces(Vec::<&str>::new());
    assert_eq!(missing_argument(create_proxy_for_instance(&generator, no_behaviors)), "behaviors");

    let no_extra = ProxyRequest::new()
        .intercepted_type(greeter_type())
        .target(greeter())
        .behaviors(Vec::new());
    assert_eq!(
        missing_argument(create_proxy_for_instance(&generator, no_extra)),
        "additional_interfaces"
    );

    // No step ran for any of them
    assert_eq!(generator.capability_checks.load(Ordering::SeqCst), 0);
    assert_eq!(generator.synthesis_calls(), 0);
}

#[test]
fn test_tc_2_2_missing_arguments_new_instance_mode() {
    let generator = CountingGenerator::new(true);

    let no_type = ProxyRequest::new()
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new())
        .constructor_args([1]);
    assert_eq!(missing_argument(create_proxy_for_new_instance(&generator, no_type)), "intercepted_type");

    let no_behaviors = ProxyRequest::new()
        .intercepted_type(counter_type())
        .additional_interfaces(Vec::<&str>::new())
        .constructor_args([1]);
    assert_eq!(missing_argument(create_proxy_for_new_instance(&generator, no_behaviors)), "behaviors");

    let no_extra = ProxyRequest::new()
        .intercepted_type(counter_type())
        .behaviors(Vec::new())
        .constructor_args([1]);
    assert_eq!(
        missing_argument(create_proxy_for_new_instance(&generator, no_extra)),
        "additional_interfaces"
    );

    let no_args = ProxyRequest::new()
        .intercepted_type(counter_type())
        .behaviors(Vec::new())
        .additional_interfaces(Vec::<&str>::new());
    assert_eq!(missing_argument(create_proxy_for_new_instance(&generator, no_args)), "constructor_args");

    assert_eq!(generator.capability_checks.load(Ordering::SeqCst), 0);
    assert_eq!(generator.synthesis_calls(), 0);
}

#[test]
fn test_tc_2_3_first_missing_argument_reported() {
    let generator = generator();
    let err = create_proxy_for_instance(&generator, ProxyRequest::new()).err().unwrap();
    assert!(matches!(err, ProxyError::Argument { name: "intercepted_type" }));
    assert_eq!(err.to_string(), "Missing required argument `intercepted_type`");
    assert_eq!(err.last_stage(), CreationStage::Unchecked);
}

#[test]
fn test_tc_3_1_capability_rejection_creates_nothing() {
    let generator = CountingGenerator::new(false);
    let touched = Arc::new(std::sync::Mutex::new(Vec::new()));

    let err = create_proxy_for_instance(
        &generator,
        instance_request().behavior(Traced::new("never", &touched)),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ProxyError::UnsupportedType { ref type_name } if type_name == IGREETER));

    let err = create_proxy_for_new_instance(&generator, new_instance_request()).err().unwrap();
    assert!(matches!(err, ProxyError::UnsupportedType { ref type_name } if type_name == COUNTER));

    assert_eq!(generator.capability_checks.load(Ordering::SeqCst), 2);
    assert_eq!(generator.synthesis_calls(), 0);
    assert!(touched.lock().unwrap().is_empty());
}

#[test]
fn test_tc_3_2_sealed_and_value_types_unsupported() {
    let generator = generator();
    let sealed = create_proxy_for_new_instance(
        &generator,
        new_instance_request().intercepted_type(counter_type().sealed()),
    );
    assert!(matches!(sealed, Err(ProxyError::UnsupportedType { .. })));

    let value = create_proxy_for_new_instance(
        &generator,
        new_instance_request().intercepted_type(TypeDescriptor::value("app.Point")),
    );
    assert!(matches!(value, Err(ProxyError::UnsupportedType { .. })));
}

#[test]
fn test_tc_4_1_construction_error_wraps_failure() {
    let generator = generator();
    let err = create_proxy_for_new_instance(
        &generator,
        new_instance_request().constructor_args(["not a number"]),
    )
    .err()
    .unwrap();

    match &err {
        ProxyError::Construction { type_name, source } => {
            assert_eq!(type_name, COUNTER);
            assert!(matches!(source, ConstructionFailure::NoMatchingConstructor { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.last_stage(), CreationStage::InterfacesAggregated);
}

#[test]
fn test_tc_4_2_unregistered_type_is_synthesis_error() {
    let generator = generator();
    let err = create_proxy_for_new_instance(
        &generator,
        new_instance_request().intercepted_type(TypeDescriptor::interface("app.IUnknown")),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        ProxyError::Synthesis { source: GeneratorError::UnknownType(_), .. }
    ));
}

#[test]
fn test_tc_4_3_target_must_be_assignable() {
    let generator = CountingGenerator::new(true);
    let err = create_proxy_for_instance(
        &generator,
        instance_request().intercepted_type(TypeDescriptor::interface("app.ICounter")),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        ProxyError::Synthesis { source: GeneratorError::NotAssignable { .. }, .. }
    ));
    assert_eq!(generator.synthesis_calls(), 0);
}

#[test]
fn test_tc_5_1_invalid_behavior_reported_before_synthesis() {
    let generator = CountingGenerator::new(true);
    let err = create_proxy_for_instance(
        &generator,
        instance_request()
            .behavior(Uppercase)
            .behavior(Requiring { name: "broken", interfaces: vec!["not valid"] }),
    )
    .err()
    .unwrap();

    match &err {
        ProxyError::InvalidBehavior { behavior, index, .. } => {
            assert_eq!(behavior, "broken");
            assert_eq!(*index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.last_stage(), CreationStage::CapabilityVerified);
    assert_eq!(generator.synthesis_calls(), 0);
}

#[test]
fn test_tc_5_2_withheld_behavior_interface_fails_attachment() {
    let generator = ReshapingGenerator::new(vec!["app.IAudited"], vec![]);
    let audit = || Requiring { name: "audit", interfaces: vec!["app.IAudited"] };

    let wrapped = create_proxy_for_instance(&generator, instance_request().behavior(Uppercase).behavior(audit()));
    let constructed = create_proxy_for_new_instance(&generator, new_instance_request().behavior(audit()));

    for (err, expected_index) in [(wrapped.err().unwrap(), 1), (constructed.err().unwrap(), 0)] {
        match &err {
            ProxyError::BehaviorAttachment { behavior, index, source } => {
                assert_eq!(behavior, "audit");
                assert_eq!(*index, expected_index);
                assert_eq!(
                    source,
                    &RegistrationError::MissingInterface { interface: "app.IAudited".to_string() }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.last_stage(), CreationStage::Synthesized);
    }
}

#[test]
fn test_tc_5_3_withheld_extra_interface_is_synthesis_error() {
    let generator = ReshapingGenerator::new(vec![IDISPOSABLE], vec![]);
    let err = create_proxy_for_instance(&generator, instance_request().additional_interface(IDISPOSABLE))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ProxyError::Synthesis { source: GeneratorError::InterfacesDropped { ref missing }, .. }
            if missing == &vec![IDISPOSABLE.to_string()]
    ));
}

#[test]
fn test_tc_5_4_unrequested_interface_rejected() {
    let generator = ReshapingGenerator::new(vec![], vec!["app.ISecretAdmin"]);

    let wrapped = create_proxy_for_instance(&generator, instance_request()).err().unwrap();
    let constructed = create_proxy_for_new_instance(&generator, new_instance_request()).err().unwrap();

    for err in [wrapped, constructed] {
        assert!(matches!(
            err,
            ProxyError::Synthesis { source: GeneratorError::InterfacesLeaked { ref leaked }, .. }
                if leaked == &vec!["app.ISecretAdmin".to_string()]
        ));
        assert_eq!(err.last_stage(), CreationStage::InterfacesAggregated);
    }

    // Injecting an interface that was requested anyway is not a leak.
    let generator = ReshapingGenerator::new(vec![], vec![IDISPOSABLE]);
    assert!(create_proxy_for_instance(&generator, instance_request().additional_interface(IDISPOSABLE)).is_ok());
}

#[test]
fn test_tc_5_5_reregistered_type_uses_new_constructor() {
    let mut generator = generator();
    let first = create_proxy_for_new_instance(&generator, new_instance_request()).unwrap();
    assert_eq!(first.invoke(&increment()), Ok(Value::Int(6)));

    generator.register(
        COUNTER,
        vec![Constructor::new([ValueKind::Int], |_: &[Value]| {
            Ok(Box::new(MethodTable::new(COUNTER).method(COUNTER, "increment", |_| Ok(Value::Int(-999))))
                as Box<dyn Target>)
        })],
    );

    let second = create_proxy_for_new_instance(&generator, new_instance_request()).unwrap();
    assert_eq!(second.invoke(&increment()), Ok(Value::Int(-999)));
    assert_eq!(first.invoke(&increment()), Ok(Value::Int(7)));
}

#[test]
fn test_tc_6_1_wrapped_target_not_owned() {
    let generator = generator();
    let target = greeter();
    let proxy = create_proxy_for_instance(&generator, instance_request().target(Arc::clone(&target))).unwrap();

    assert_eq!(Arc::strong_count(&target), 1);
    assert_eq!(proxy.invoke(&greet()), Ok(Value::from("hi")));

    drop(target);
    assert_eq!(proxy.invoke(&greet()), Err(InvocationError::TargetDropped));
}

#[test]
fn test_tc_6_2_concurrent_creation() {
    let generator = Arc::new(generator());
    let handles: Vec<_> = (0..8)
        .map(|seed| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                let proxy = create_proxy_for_new_instance(
                    generator.as_ref(),
                    ProxyRequest::new()
                        .intercepted_type(counter_type())
                        .behavior(Uppercase)
                        .additional_interfaces(Vec::<&str>::new())
                        .constructor_args([seed]),
                )
                .unwrap();
                proxy.invoke(&increment()).unwrap()
            })
        })
        .collect();

    let mut results: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().as_int().unwrap())
        .collect();
    results.sort();
    assert_eq!(results, (1..=8).collect::<Vec<i64>>());
    assert_eq!(generator.cached_types(), 1);
}
