//! Generator configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::InterfaceDescriptor;

/// Default name of the capability interface every generated proxy exposes.
pub const DEFAULT_PROXY_MARKER: &str = "intercept.IInterceptingProxy";

/// Settings for [`crate::proxy::DynamicProxyGenerator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Reuse synthesized proxy types for identical (type, interfaces) requests.
    pub cache_proxy_types: bool,
    /// Upper bound on cached proxy types; new types are not cached past it.
    pub max_cached_types: usize,
    /// Interface name marking a value as an intercepting proxy.
    pub proxy_marker: String,
}

/// Errors from loading or validating a [`GeneratorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Proxy marker {0:?} is not a well-formed interface name")]
    InvalidMarker(String),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cache_proxy_types: true,
            max_cached_types: 256,
            proxy_marker: DEFAULT_PROXY_MARKER.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker().is_well_formed() {
            Ok(())
        } else {
            Err(ConfigError::InvalidMarker(self.proxy_marker.clone()))
        }
    }

    pub fn marker(&self) -> InterfaceDescriptor {
        InterfaceDescriptor::new(self.proxy_marker.clone())
    }
}
