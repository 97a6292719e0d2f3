//! # gchost-events
//!
//! Diagnostic event types shared between the host and collector
//! implementations: the provider/level/keyword vocabulary, the per-provider
//! enablement gate, payload serialization, and the sinks that receive
//! recorded events.
use std::fmt::{self, Display, Formatter};
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

pub mod descriptor;
pub mod gate;
pub mod payload;
pub mod sink;

pub use descriptor::EventDescriptor;
pub use gate::EventGate;
pub use payload::{serialize_event, EventPayload};
pub use sink::{EventRecorder, EventSink, NullSink, RecordedEvent};

/// The two event providers a collector can raise events through.
///
/// Public events form the stable diagnostic surface; private events carry
/// implementation detail that tooling opts into separately.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventProvider {
    Public = 0,
    Private = 1,
}

impl EventProvider {
    pub const COUNT: usize = 2;
    pub const ALL: [EventProvider; EventProvider::COUNT] =
        [EventProvider::Public, EventProvider::Private];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(EventProvider::Public),
            1 => Some(EventProvider::Private),
            _ => None,
        }
    }
}

/// Verbosity threshold attached to every event.
///
/// Ordered: a provider enabled at some level delivers every event at that
/// level or below. `Max` is a bound marker, not a valid event level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum EventLevel {
    None = 0,
    Fatal = 1,
    Error = 2,
    Warning = 3,
    Informational = 4,
    Verbose = 5,
    Max = 6,
}

impl EventLevel {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(EventLevel::None),
            1 => Some(EventLevel::Fatal),
            2 => Some(EventLevel::Error),
            3 => Some(EventLevel::Warning),
            4 => Some(EventLevel::Informational),
            5 => Some(EventLevel::Verbose),
            6 => Some(EventLevel::Max),
            _ => None,
        }
    }
}

/// Bitset selecting event categories within a provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKeywords(pub u32);

impl EventKeywords {
    pub const EMPTY: Self = EventKeywords(0);
    pub const GC: Self = EventKeywords(0x1);
    pub const GC_HANDLE: Self = EventKeywords(0x2);
    pub const GC_HEAP_DUMP: Self = EventKeywords(0x10_0000);
    pub const GC_SAMPLED_OBJECT_ALLOCATION: Self = EventKeywords(0x20_0000);
    pub const GC_HEAP_SURVIVAL_AND_MOVEMENT: Self = EventKeywords(0x40_0000);
    pub const GC_HEAP_COLLECT: Self = EventKeywords(0x80_0000);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for EventKeywords {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for EventKeywords {
    fn from(bits: u32) -> Self {
        EventKeywords(bits)
    }
}

impl From<EventKeywords> for u32 {
    fn from(keywords: EventKeywords) -> Self {
        keywords.0
    }
}

impl BitOr for EventKeywords {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        EventKeywords(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventKeywords {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventKeywords {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        EventKeywords(self.0 & rhs.0)
    }
}

impl Not for EventKeywords {
    type Output = Self;
    fn not(self) -> Self {
        EventKeywords(!self.0)
    }
}
