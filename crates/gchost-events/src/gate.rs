//! Per-provider event enablement state.

use gchost_utils::sync::{AtomicU32, Ordering};

use crate::{EventKeywords, EventLevel, EventProvider};

/// Tracks which diagnostic event categories are currently enabled for each
/// provider.
///
/// Levels and keyword bitsets live in independent atomics. A reader always
/// sees a complete write of each field, but a level and a keyword set read
/// together may come from different updates; callers that need a consistent
/// pair must serialize against the control entry point instead.
pub struct EventGate {
    enabled_levels: [AtomicU32; EventProvider::COUNT],
    enabled_keywords: [AtomicU32; EventProvider::COUNT],
}

impl EventGate {
    pub const fn new() -> Self {
        Self {
            enabled_levels: [AtomicU32::new(0), AtomicU32::new(0)],
            enabled_keywords: [AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    /// True iff an event with `keywords` at `level` should currently be
    /// raised through `provider`.
    ///
    /// Hot path: two acquire loads, no locks, callable from any thread.
    pub fn is_enabled(
        &self,
        provider: EventProvider,
        keywords: EventKeywords,
        level: EventLevel,
    ) -> bool {
        debug_assert!(level < EventLevel::Max);
        let index = provider.index();
        self.enabled_levels[index].load(Ordering::Acquire) >= level.as_u32()
            && EventKeywords(self.enabled_keywords[index].load(Ordering::Acquire))
                .intersects(keywords)
    }

    /// Apply an enable or disable request from the control entry point.
    ///
    /// Enabling overwrites the level and ORs the keywords in; disabling
    /// drops the level to `None` and masks the keywords out. The two fields
    /// are updated independently.
    pub fn set_state(
        &self,
        provider: EventProvider,
        keywords: EventKeywords,
        level: EventLevel,
        enabled: bool,
    ) {
        debug_assert!(level < EventLevel::Max);
        let index = provider.index();
        if enabled {
            self.enabled_levels[index].store(level.as_u32(), Ordering::Release);
            self.enabled_keywords[index].fetch_or(keywords.as_u32(), Ordering::AcqRel);
        } else {
            self.enabled_levels[index].store(EventLevel::None.as_u32(), Ordering::Release);
            self.enabled_keywords[index].fetch_and(!keywords.as_u32(), Ordering::AcqRel);
        }
    }

    pub fn enabled_level(&self, provider: EventProvider) -> EventLevel {
        let raw = self.enabled_levels[provider.index()].load(Ordering::Acquire);
        // The slot only ever holds values written through set_state.
        EventLevel::from_raw(raw).unwrap_or(EventLevel::None)
    }

    pub fn enabled_keywords(&self, provider: EventProvider) -> EventKeywords {
        EventKeywords(self.enabled_keywords[provider.index()].load(Ordering::Acquire))
    }
}

impl Default for EventGate {
    fn default() -> Self {
        Self::new()
    }
}
