//! Behavior attachment.

use std::sync::Arc;

use crate::behavior::Behavior;
use crate::error::{ProxyError, Result};
use crate::proxy::{InterceptingProxy, RegistrationError};

/// Register `behaviors` on `proxy` in exactly the order given.
///
/// The first behavior becomes the outermost link of the chain. A behavior
/// whose required interfaces the proxy does not expose is refused here,
/// whatever the proxy's own registration would do.
pub fn attach(proxy: &mut dyn InterceptingProxy, behaviors: &[Arc<dyn Behavior>]) -> Result<()> {
    for (index, behavior) in behaviors.iter().enumerate() {
        let attached = match behavior
            .required_interfaces()
            .into_iter()
            .find(|i| !proxy.implements(i))
        {
            Some(missing) => Err(RegistrationError::MissingInterface {
                interface: missing.name().to_string(),
            }),
            None => proxy.add_behavior(Arc::clone(behavior)),
        };
        attached.map_err(|source| ProxyError::BehaviorAttachment {
            behavior: behavior.name().to_string(),
            index,
            source,
        })?;
    }
    Ok(())
}
