//! Proxy synthesis through the opaque generator.
//!
//! After the generator returns, the proxy's interface set is checked
//! against what was asked for. Interfaces only a behavior asked for are
//! left to the attacher, which reports the behavior that needed them.

use std::sync::Arc;

use crate::error::{ProxyError, Result};
use crate::proxy::{GeneratorError, InterceptingProxy, ProxyGenerator, Target};
use crate::types::{InterfaceSet, TypeDescriptor, Value};

/// Wrap-existing-instance mode.
///
/// `required` is the aggregated set; `extra` the caller's additional
/// interfaces, which are a subset of it.
pub fn synthesize_for_instance(
    generator: &dyn ProxyGenerator,
    ty: &TypeDescriptor,
    target: &Arc<dyn Target>,
    required: &InterfaceSet,
    extra: &InterfaceSet,
) -> Result<Box<dyn InterceptingProxy>> {
    if !target.is_assignable_to(ty) {
        return Err(synthesis_error(
            ty,
            GeneratorError::NotAssignable {
                target: target.type_name().to_string(),
                expected: ty.name().to_string(),
            },
        ));
    }
    let proxy = generator
        .create_proxy(ty, target, required)
        .map_err(|source| synthesis_error(ty, source))?;
    verify_interfaces(generator, ty, required, extra, proxy.as_ref())?;
    Ok(proxy)
}

/// New-instance mode: synthesize a proxy type, then construct it with `args`.
///
/// Constructor resolution is left entirely to the generator.
pub fn synthesize_new_instance(
    generator: &dyn ProxyGenerator,
    ty: &TypeDescriptor,
    required: &InterfaceSet,
    extra: &InterfaceSet,
    args: &[Value],
) -> Result<Box<dyn InterceptingProxy>> {
    let proxy_type = generator
        .create_proxy_type(ty, required)
        .map_err(|source| synthesis_error(ty, source))?;
    let proxy = proxy_type
        .construct(args)
        .map_err(|source| ProxyError::Construction {
            type_name: ty.name().to_string(),
            source,
        })?;
    verify_interfaces(generator, ty, required, extra, proxy.as_ref())?;
    Ok(proxy)
}

/// The proxy exposes nothing outside `contract ∪ required ∪ {marker}`, and
/// at least `contract ∪ extra ∪ {marker}`.
fn verify_interfaces(
    generator: &dyn ProxyGenerator,
    ty: &TypeDescriptor,
    required: &InterfaceSet,
    extra: &InterfaceSet,
    proxy: &dyn InterceptingProxy,
) -> Result<()> {
    let mut base = ty.contract();
    base.insert(generator.proxy_marker().clone());

    let missing: Vec<String> = base
        .union(extra)
        .iter()
        .filter(|i| !proxy.implements(i))
        .map(|i| i.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(synthesis_error(ty, GeneratorError::InterfacesDropped { missing }));
    }

    let allowed = base.union(required);
    let leaked: Vec<String> = proxy
        .implemented_interfaces()
        .iter()
        .filter(|i| !allowed.contains(i))
        .map(|i| i.name().to_string())
        .collect();
    if !leaked.is_empty() {
        return Err(synthesis_error(ty, GeneratorError::InterfacesLeaked { leaked }));
    }
    Ok(())
}

fn synthesis_error(ty: &TypeDescriptor, source: GeneratorError) -> ProxyError {
    ProxyError::Synthesis {
        type_name: ty.name().to_string(),
        source,
    }
}
