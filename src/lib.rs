//! # Intercept-Proxy
//!
//! Intercepting proxies: stand-ins that expose the same contract as a
//! target type but route every call through an ordered chain of
//! cross-cutting behaviors (logging, validation, caching, ...) before the
//! real implementation runs.
//!
//! ## Features
//!
//! - **Capability Gate**: types the generator cannot proxy fail fast
//! - **Interface Aggregation**: behaviors declare interfaces the proxy must expose
//! - **Two Modes**: wrap an existing instance, or construct a new one
//! - **Ordered Chains**: first behavior is outermost, last is next to the target
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use intercept_proxy::behavior::{Behavior, Next};
//! use intercept_proxy::proxy::{DynamicProxyGenerator, MethodTable};
//! use intercept_proxy::{create_proxy_for_instance, CallResult, MethodCall, ProxyRequest, TypeDescriptor, Value};
//!
//! struct Uppercase;
//!
//! impl Behavior for Uppercase {
//!     fn name(&self) -> &str {
//!         "uppercase"
//!     }
//!
//!     fn invoke(&self, call: &MethodCall, next: Next<'_>) -> CallResult {
//!         let value = next.run(call)?;
//!         Ok(value.as_str().map(|s| Value::from(s.to_uppercase())).unwrap_or(value))
//!     }
//! }
//!
//! let generator = DynamicProxyGenerator::new();
//! let greeter = Arc::new(MethodTable::new("app.Greeter").method("app.IGreeter", "greet", |_| Ok(Value::from("hi"))));
//!
//! let proxy = create_proxy_for_instance(
//!     &generator,
//!     ProxyRequest::new()
//!         .intercepted_type(TypeDescriptor::interface("app.IGreeter"))
//!         .target(Arc::clone(&greeter))
//!         .behavior(Uppercase)
//!         .additional_interfaces(Vec::<&str>::new()),
//! )
//! .unwrap();
//!
//! let greeting = proxy.invoke(&MethodCall::new("app.IGreeter", "greet")).unwrap();
//! assert_eq!(greeting, Value::from("HI"));
//! ```

pub mod behavior;
pub mod config;
pub mod creation;
pub mod error;
pub mod proxy;
pub mod types;

// Re-export entry points
pub use creation::{create_proxy_for_instance, create_proxy_for_new_instance, CreationStage, ProxyRequest};

// Re-export types
pub use behavior::{Behavior, BehaviorPipeline, Next};
pub use config::{ConfigError, GeneratorConfig};
pub use error::{CallResult, InvocationError, ProxyError, Result};
pub use proxy::{InterceptingProxy, ProxyGenerator, Target};
pub use types::{InterfaceDescriptor, InterfaceSet, MemberDescriptor, MethodCall, TypeDescriptor, TypeKind, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
