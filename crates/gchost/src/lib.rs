//! # gchost
//!
//! Bootstrap and live-configuration layer for a pluggable garbage
//! collector. The host owns one [`CollectorHost`]; a distinguished thread
//! activates it exactly once, locating the collector in-process or in a
//! standalone module, validating its interface version, and publishing it
//! for the rest of the process. Any thread may request event
//! reconfiguration at any time; requests that arrive before the collector
//! is live wait in a single-slot stash and are delivered on publish.

pub mod abi;
pub mod activation;
pub mod builtin;
pub mod collector;
pub mod config;
pub mod error;
pub mod provider;
pub mod services;
pub mod stash;
pub mod version;

pub use activation::{ActivationStatus, CollectorHost};
pub use builtin::{DefaultCollector, DefaultHandleManager};
pub use collector::{
    Collector, CollectorHandle, HandleManager, HandleManagerHandle, HostCallbacks,
    InitializedCollector,
};
pub use config::HostConfig;
pub use error::ActivationError;
pub use provider::{CollectorProvider, LinkedProvider, Provider, StandaloneProvider};
pub use services::HostServices;
pub use version::{InterfaceVersion, HOST_MAJOR_VERSION, HOST_MINOR_VERSION};

pub use gchost_events::{
    EventGate, EventKeywords, EventLevel, EventProvider, EventRecorder, EventSink, NullSink,
    RecordedEvent,
};
