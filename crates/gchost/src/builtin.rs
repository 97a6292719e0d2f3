//! The collector linked into the host itself.

use gchost_events::descriptor::known;
use gchost_events::{EventGate, EventKeywords, EventLevel, EventProvider, EventSink};
use gchost_utils::sync::Arc;

use crate::collector::{Collector, HandleManager, HostCallbacks};
use crate::version::{InterfaceVersion, HOST_MAJOR_VERSION, HOST_MINOR_VERSION};

/// Adapts the host callback surface to the event sink the descriptor
/// helpers expect.
struct HostEventSink(Arc<dyn HostCallbacks>);

impl EventSink for HostEventSink {
    fn record(&self, name: &str, payload: &[u8]) {
        self.0.record_event(name, payload);
    }
}

/// In-process collector used when no standalone module is configured.
pub struct DefaultCollector {
    gate: Arc<EventGate>,
    events: HostEventSink,
}

impl DefaultCollector {
    pub fn new(gate: Arc<EventGate>, host: Arc<dyn HostCallbacks>) -> Self {
        DefaultCollector {
            gate,
            events: HostEventSink(host),
        }
    }

    /// Interface version the linked collector implements. Always the
    /// host's own, so validation can never reject it.
    pub fn version() -> InterfaceVersion {
        InterfaceVersion {
            major: HOST_MAJOR_VERSION,
            minor: HOST_MINOR_VERSION,
            build: 0,
            name: String::from("default"),
        }
    }

    pub fn gate(&self) -> &Arc<EventGate> {
        &self.gate
    }

    /// Raise the trigger notification and the begin/end pair for one
    /// collection.
    pub fn record_collection_cycle(
        &self,
        count: u32,
        depth: u32,
        reason: u32,
        collection_type: u32,
    ) {
        known::fire_gc_triggered(&self.gate, &self.events, reason);
        known::fire_gc_start(&self.gate, &self.events, count, depth, reason, collection_type);
        known::fire_gc_end(&self.gate, &self.events, count, depth);
    }
}

impl Collector for DefaultCollector {
    fn control_events(&self, provider: EventProvider, keywords: EventKeywords, level: EventLevel) {
        // Level None is the disable request shape; anything else enables.
        let enabled = level != EventLevel::None;
        self.gate.set_state(provider, keywords, level, enabled);
    }
}

/// Handle storage for the linked collector. The host never looks inside.
pub struct DefaultHandleManager;

impl HandleManager for DefaultHandleManager {}
