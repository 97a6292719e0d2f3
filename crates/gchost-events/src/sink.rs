//! Destinations for recorded events.

use crossbeam_channel::{bounded, Receiver, Sender};
use gchost_utils::sync::{AtomicU64, Ordering};

/// Receives fully serialized dynamic events.
///
/// Implementations must tolerate concurrent callers and must not block the
/// raising thread; events are raised from inside the collector.
pub trait EventSink: Send + Sync {
    fn record(&self, name: &str, payload: &[u8]);
}

/// A sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _name: &str, _payload: &[u8]) {}
}

/// One event as drained from an [`EventRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Queue depth used by [`EventRecorder::with_default_capacity`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Bounded, non-blocking event recorder.
///
/// Events are pushed with `try_send`; when the queue is full the event is
/// counted and dropped rather than stalling the raiser. The consuming side
/// owns the receiver and drains at its own pace.
pub struct EventRecorder {
    tx: Sender<RecordedEvent>,
    dropped: AtomicU64,
}

impl EventRecorder {
    pub fn new(capacity: usize) -> (Self, Receiver<RecordedEvent>) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    pub fn with_default_capacity() -> (Self, Receiver<RecordedEvent>) {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Number of events dropped because the queue was full or disconnected.
    ///
    /// Relaxed: the counter is diagnostic only and orders nothing.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for EventRecorder {
    fn record(&self, name: &str, payload: &[u8]) {
        let event = RecordedEvent {
            name: name.to_owned(),
            payload: payload.to_vec(),
        };
        if self.tx.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
