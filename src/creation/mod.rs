//! Proxy creation: capability gate, interface aggregation, synthesis and
//! behavior attachment, run in that order.
//!
//! Each call to an entry point walks
//! `Unchecked -> CapabilityVerified -> InterfacesAggregated -> Synthesized -> BehaviorsAttached`.
//! A failing step stops the walk; nothing built so far is returned.

pub mod aggregator;
pub mod attacher;
pub mod gate;
pub mod request;
pub mod synthesizer;

pub use aggregator::aggregate;
pub use attacher::attach;
pub use gate::check_capability;
pub use request::{create_proxy_for_instance, create_proxy_for_new_instance, ProxyRequest};

use serde::{Deserialize, Serialize};

/// Progress of one proxy creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreationStage {
    Unchecked,
    CapabilityVerified,
    InterfacesAggregated,
    Synthesized,
    BehaviorsAttached,
}
