//! Interface aggregation.
//!
//! The result is a set: the order behaviors are listed in does not change
//! it. Attachment order is a separate concern handled by the attacher.

use std::sync::Arc;

use crate::behavior::Behavior;
use crate::error::{ProxyError, Result};
use crate::types::InterfaceSet;

/// Union of `extra` and every interface the behaviors require.
pub fn aggregate(behaviors: &[Arc<dyn Behavior>], extra: &InterfaceSet) -> Result<InterfaceSet> {
    let mut required = extra.clone();
    for (index, behavior) in behaviors.iter().enumerate() {
        for interface in behavior.required_interfaces() {
            if !interface.is_well_formed() {
                return Err(ProxyError::InvalidBehavior {
                    behavior: behavior.name().to_string(),
                    index,
                    reason: format!("malformed required interface {:?}", interface.name()),
                });
            }
            required.insert(interface);
        }
    }
    Ok(required)
}
