//! Error types for proxy creation and intercepted calls.
//!
//! Creation failures are all-or-nothing: any [`ProxyError`] means no proxy
//! was handed back and all work from that call was discarded.

use thiserror::Error;

use crate::creation::CreationStage;
use crate::proxy::{ConstructionFailure, GeneratorError, RegistrationError};

/// Errors that can occur while creating an intercepting proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required input was never supplied
    #[error("Missing required argument `{name}`")]
    Argument { name: &'static str },

    /// The generator cannot produce a proxy for this type
    #[error("Type {type_name} cannot be intercepted")]
    UnsupportedType { type_name: String },

    /// A behavior declared a malformed required interface
    #[error("Behavior `{behavior}` at position {index} is invalid: {reason}")]
    InvalidBehavior {
        behavior: String,
        index: usize,
        reason: String,
    },

    /// The generator failed to produce a proxy or proxy type
    #[error("Proxy synthesis failed for {type_name}: {source}")]
    Synthesis {
        type_name: String,
        #[source]
        source: GeneratorError,
    },

    /// Instantiating a synthesized proxy type failed
    #[error("Construction of proxy for {type_name} failed: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: ConstructionFailure,
    },

    /// The synthesized proxy refused a behavior
    #[error("Behavior `{behavior}` at position {index} could not be attached: {source}")]
    BehaviorAttachment {
        behavior: String,
        index: usize,
        #[source]
        source: RegistrationError,
    },
}

impl ProxyError {
    /// The last stage creation reached before this failure.
    pub fn last_stage(&self) -> CreationStage {
        match self {
            Self::Argument { .. } | Self::UnsupportedType { .. } => CreationStage::Unchecked,
            Self::InvalidBehavior { .. } => CreationStage::CapabilityVerified,
            Self::Synthesis { .. } | Self::Construction { .. } => CreationStage::InterfacesAggregated,
            Self::BehaviorAttachment { .. } => CreationStage::Synthesized,
        }
    }
}

/// Errors raised while routing a call through a proxy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error("Interface {interface} is not exposed by the proxy for {type_name}")]
    InterfaceNotImplemented { type_name: String, interface: String },

    #[error("No implementation for {interface}::{method}")]
    NotImplemented { interface: String, method: String },

    #[error("Wrapped target has been dropped")]
    TargetDropped,

    /// Raised by a target or a behavior
    #[error("Call failed: {reason}")]
    Failed { reason: String },
}

impl InvocationError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Result type alias for proxy creation.
pub type Result<T> = core::result::Result<T, ProxyError>;

/// Result of one intercepted call.
pub type CallResult = core::result::Result<crate::types::Value, InvocationError>;
