//! Single-slot parking for event reconfiguration requests that arrive
//! before a collector is live.

use gchost_events::{EventKeywords, EventLevel, EventProvider};
use gchost_utils::sync::Ordering;
use gchost_utils::AtomicPair;

/// One overwrite-on-write slot per provider.
///
/// Requests recorded before activation completes wait here, newest
/// replacing oldest. The keyword bitset rides in the high half of each
/// slot and the level in the low half, so a read never sees halves from
/// two different requests.
pub struct EventStateStash {
    slots: [AtomicPair; EventProvider::COUNT],
}

impl EventStateStash {
    pub const fn new() -> Self {
        // (EMPTY, None) is the neutral state; both halves encode as zero.
        EventStateStash {
            slots: [AtomicPair::new(0, 0), AtomicPair::new(0, 0)],
        }
    }

    /// Park a request, replacing whatever was there.
    ///
    /// A SeqCst exchange rather than a plain store: the read-modify-write
    /// is what synchronizes a record racing the activation drain, so the
    /// caller's subsequent handle check cannot miss the publish.
    pub fn record(&self, provider: EventProvider, keywords: EventKeywords, level: EventLevel) {
        self.slots[provider.index()].swap(keywords.as_u32(), level.as_u32(), Ordering::SeqCst);
    }

    /// Take the parked request, leaving the neutral state behind.
    pub fn take_and_clear(&self, provider: EventProvider) -> (EventKeywords, EventLevel) {
        let (keywords, level) = self.slots[provider.index()].swap(0, 0, Ordering::SeqCst);
        // The slot only ever holds values written by record.
        let level = EventLevel::from_raw(level).unwrap_or(EventLevel::None);
        (EventKeywords(keywords), level)
    }
}

impl Default for EventStateStash {
    fn default() -> Self {
        EventStateStash::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use gchost_utils::sync::{Arc, AtomicBool};

    use super::*;

    #[test]
    fn test_last_record_wins() {
        let stash = EventStateStash::new();
        stash.record(
            EventProvider::Public,
            EventKeywords(0b101),
            EventLevel::Informational,
        );
        stash.record(EventProvider::Public, EventKeywords(0b010), EventLevel::Verbose);

        let (keywords, level) = stash.take_and_clear(EventProvider::Public);
        assert_eq!(keywords, EventKeywords(0b010));
        assert_eq!(level, EventLevel::Verbose);
    }

    #[test]
    fn test_take_leaves_neutral_state() {
        let stash = EventStateStash::new();
        stash.record(EventProvider::Private, EventKeywords::GC, EventLevel::Warning);

        stash.take_and_clear(EventProvider::Private);
        let (keywords, level) = stash.take_and_clear(EventProvider::Private);
        assert_eq!(keywords, EventKeywords::EMPTY);
        assert_eq!(level, EventLevel::None);
    }

    #[test]
    fn test_providers_are_independent() {
        let stash = EventStateStash::new();
        stash.record(EventProvider::Public, EventKeywords::GC, EventLevel::Error);

        let (keywords, level) = stash.take_and_clear(EventProvider::Private);
        assert_eq!(keywords, EventKeywords::EMPTY);
        assert_eq!(level, EventLevel::None);

        let (keywords, _) = stash.take_and_clear(EventProvider::Public);
        assert_eq!(keywords, EventKeywords::GC);
    }

    #[test]
    fn test_concurrent_records_keep_halves_paired() {
        let stash = Arc::new(EventStateStash::new());
        let stop = Arc::new(AtomicBool::new(false));

        // Every writer maintains keywords % 6 == level, so a torn slot
        // would be caught by the reader.
        let writers: Vec<_> = (0..4u32)
            .map(|t| {
                let stash = stash.clone();
                thread::spawn(move || {
                    for i in 0..1_000u32 {
                        let bits = t * 1_000 + i;
                        let level = EventLevel::from_raw(bits % 6).unwrap();
                        stash.record(EventProvider::Public, EventKeywords(bits), level);
                    }
                })
            })
            .collect();

        let reader = {
            let stash = stash.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let (keywords, level) = stash.take_and_clear(EventProvider::Public);
                    assert_eq!(keywords.as_u32() % 6, level.as_u32());
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        stop.store(true, Ordering::Relaxed);
        reader.join().unwrap();

        let (keywords, level) = stash.take_and_clear(EventProvider::Public);
        assert_eq!(keywords.as_u32() % 6, level.as_u32());
    }
}
