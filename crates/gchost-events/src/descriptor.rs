//! Event descriptors and the well-known collector events.

use crate::gate::EventGate;
use crate::payload::{serialize_event, EventPayload};
use crate::sink::EventSink;
use crate::{EventKeywords, EventLevel, EventProvider};

/// Static description of one dynamic event: its name plus the provider,
/// keywords, and level that gate its delivery.
#[derive(Copy, Clone, Debug)]
pub struct EventDescriptor {
    name: &'static str,
    provider: EventProvider,
    keywords: EventKeywords,
    level: EventLevel,
}

impl EventDescriptor {
    pub const fn new(
        name: &'static str,
        provider: EventProvider,
        keywords: EventKeywords,
        level: EventLevel,
    ) -> Self {
        Self {
            name,
            provider,
            keywords,
            level,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn provider(&self) -> EventProvider {
        self.provider
    }

    pub fn is_enabled(&self, gate: &EventGate) -> bool {
        gate.is_enabled(self.provider, self.keywords, self.level)
    }

    /// Serialize `payload` and record it through `sink` if the gate
    /// currently enables this event.
    ///
    /// Best effort: when serialization cannot allocate, the event is
    /// silently dropped.
    pub fn fire<P: EventPayload>(&self, gate: &EventGate, sink: &dyn EventSink, payload: &P) {
        if !self.is_enabled(gate) {
            return;
        }
        let Some(bytes) = serialize_event(payload) else {
            return;
        };
        sink.record(self.name, &bytes);
    }
}

/// Descriptors and firing helpers for the events every collector raises.
pub mod known {
    use super::*;

    pub const GC_START: EventDescriptor = EventDescriptor::new(
        "GCStart_V2",
        EventProvider::Public,
        EventKeywords::GC,
        EventLevel::Informational,
    );

    pub const GC_END: EventDescriptor = EventDescriptor::new(
        "GCEnd_V1",
        EventProvider::Public,
        EventKeywords::GC,
        EventLevel::Informational,
    );

    pub const GC_TRIGGERED: EventDescriptor = EventDescriptor::new(
        "GCTriggered",
        EventProvider::Public,
        EventKeywords::GC,
        EventLevel::Informational,
    );

    pub const GC_CREATE_SEGMENT: EventDescriptor = EventDescriptor::new(
        "GCCreateSegment_V1",
        EventProvider::Public,
        EventKeywords::GC,
        EventLevel::Informational,
    );

    pub const GC_GENERATION_RANGE: EventDescriptor = EventDescriptor::new(
        "GCGenerationRange",
        EventProvider::Public,
        EventKeywords::GC_HEAP_SURVIVAL_AND_MOVEMENT,
        EventLevel::Informational,
    );

    pub const BGC_BEGIN: EventDescriptor = EventDescriptor::new(
        "BGCBegin",
        EventProvider::Private,
        EventKeywords::GC,
        EventLevel::Informational,
    );

    pub fn fire_gc_start(
        gate: &EventGate,
        sink: &dyn EventSink,
        count: u32,
        depth: u32,
        reason: u32,
        collection_type: u32,
    ) {
        GC_START.fire(gate, sink, &(count, depth, reason, collection_type));
    }

    pub fn fire_gc_end(gate: &EventGate, sink: &dyn EventSink, count: u32, depth: u32) {
        GC_END.fire(gate, sink, &(count, depth));
    }

    pub fn fire_gc_triggered(gate: &EventGate, sink: &dyn EventSink, reason: u32) {
        GC_TRIGGERED.fire(gate, sink, &reason);
    }

    pub fn fire_gc_create_segment(
        gate: &EventGate,
        sink: &dyn EventSink,
        address: u64,
        size: u64,
        segment_type: u32,
    ) {
        GC_CREATE_SEGMENT.fire(gate, sink, &(address, size, segment_type));
    }

    pub fn fire_gc_generation_range(
        gate: &EventGate,
        sink: &dyn EventSink,
        generation: u8,
        range_start: u64,
        used: u64,
        reserved: u64,
    ) {
        GC_GENERATION_RANGE.fire(gate, sink, &(generation, range_start, used, reserved));
    }

    pub fn fire_bgc_begin(gate: &EventGate, sink: &dyn EventSink) {
        BGC_BEGIN.fire(gate, sink, &());
    }
}
