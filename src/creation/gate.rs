//! Capability gate.

use crate::error::{ProxyError, Result};
use crate::proxy::ProxyGenerator;
use crate::types::TypeDescriptor;

/// Ask the generator whether `ty` can be proxied at all.
///
/// Must run before anything else touches behaviors or the generator.
pub fn check_capability(generator: &dyn ProxyGenerator, ty: &TypeDescriptor) -> Result<()> {
    if generator.can_intercept(ty) {
        Ok(())
    } else {
        Err(ProxyError::UnsupportedType {
            type_name: ty.name().to_string(),
        })
    }
}
