//! Interfaces between the host and a collector implementation.

use gchost_events::{EventKeywords, EventLevel, EventProvider};
use gchost_utils::sync::Arc;

/// A live, initialized collector.
///
/// The host publishes exactly one for the life of the process once
/// activation succeeds. Implementations must be callable from any thread;
/// the host itself serializes `control_events`.
pub trait Collector: Send + Sync {
    /// Reconfigure event enablement.
    ///
    /// Invoked with the host's event lock held, so at most one call is in
    /// flight process-wide. Last write wins; re-delivery of the same state
    /// must be harmless.
    fn control_events(&self, provider: EventProvider, keywords: EventKeywords, level: EventLevel);
}

impl std::fmt::Debug for dyn Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Collector")
    }
}

/// Owner of the collector's handle table.
///
/// Opaque to the host; the addressing scheme lives entirely on the
/// collector side. The host only keeps the owner alive.
pub trait HandleManager: Send + Sync {}

pub type CollectorHandle = Arc<dyn Collector>;
pub type HandleManagerHandle = Arc<dyn HandleManager>;

/// Capabilities the host exposes to a collector during and after
/// initialization.
pub trait HostCallbacks: Send + Sync {
    /// Integer-valued configuration lookup; `None` when the key is unset.
    fn config_value(&self, key: &str) -> Option<i64>;

    /// Record a fully serialized dynamic event. Best effort; must not
    /// block the raising thread.
    fn record_event(&self, name: &str, payload: &[u8]);
}

/// Everything a provider hands back from a successful initialization.
pub struct InitializedCollector {
    pub collector: CollectorHandle,
    pub handle_manager: HandleManagerHandle,
}
