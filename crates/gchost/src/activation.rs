//! Single-shot collector activation and live event reconfiguration.
//!
//! The ordering protocol: a reconfiguring thread exchanges its request
//! into the stash, then checks the published handle, then forwards under
//! the event lock if the handle is there. The activating thread publishes
//! the handle and drains the stash under that same lock. Between them no
//! request is lost and no two control calls overlap. A request that lands
//! mid-publish may be delivered twice, once from the stash and once
//! directly, which the collector contract makes harmless.

use std::path::Path;

use gchost_events::{EventKeywords, EventLevel, EventProvider};
use gchost_utils::sync::{Arc, AtomicU8, Mutex, OnceLock, Ordering};
use tracing::{error, info};

use crate::collector::{
    CollectorHandle, HandleManagerHandle, HostCallbacks, InitializedCollector,
};
use crate::error::ActivationError;
use crate::provider::{CollectorProvider, LinkedProvider, Provider, StandaloneProvider};
use crate::stash::EventStateStash;
use crate::version::{InterfaceVersion, HOST_MAJOR_VERSION, HOST_MINOR_VERSION};

/// How far activation progressed, for post-mortem triage. Monotonic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ActivationStatus {
    NotStarted = 0,
    Started = 1,
    ModuleLocated = 2,
    VersionObtained = 3,
    VersionValidated = 4,
    EntryPointLocated = 5,
    Complete = 6,
}

impl ActivationStatus {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ActivationStatus::NotStarted,
            1 => ActivationStatus::Started,
            2 => ActivationStatus::ModuleLocated,
            3 => ActivationStatus::VersionObtained,
            4 => ActivationStatus::VersionValidated,
            5 => ActivationStatus::EntryPointLocated,
            _ => ActivationStatus::Complete,
        }
    }
}

/// Owner of the process's collector.
///
/// One distinguished thread calls [`CollectorHost::activate`] exactly
/// once, before any allocation needs the collector. Any thread may call
/// [`CollectorHost::record_event_state_change`] at any time, before or
/// after.
pub struct CollectorHost {
    status: AtomicU8,
    collector: OnceLock<CollectorHandle>,
    handle_manager: OnceLock<HandleManagerHandle>,
    version: OnceLock<InterfaceVersion>,
    stash: EventStateStash,
    /// Serializes every call into the collector's control entry point,
    /// including the publish-and-drain step of activation itself.
    event_lock: Mutex<()>,
    callbacks: Arc<dyn HostCallbacks>,
    expected_major: u32,
    expected_minor: u32,
}

impl CollectorHost {
    pub fn new(callbacks: Arc<dyn HostCallbacks>) -> Self {
        CollectorHost::with_expected_version(callbacks, HOST_MAJOR_VERSION, HOST_MINOR_VERSION)
    }

    /// Host that validates implementations against a version other than
    /// its compiled-in one.
    pub fn with_expected_version(
        callbacks: Arc<dyn HostCallbacks>,
        expected_major: u32,
        expected_minor: u32,
    ) -> Self {
        CollectorHost {
            status: AtomicU8::new(ActivationStatus::NotStarted as u8),
            collector: OnceLock::new(),
            handle_manager: OnceLock::new(),
            version: OnceLock::new(),
            stash: EventStateStash::new(),
            event_lock: Mutex::new(()),
            callbacks,
            expected_major,
            expected_minor,
        }
    }

    pub fn status(&self) -> ActivationStatus {
        ActivationStatus::from_raw(self.status.load(Ordering::Acquire))
    }

    /// The live collector, once activation has published one.
    pub fn collector(&self) -> Option<&CollectorHandle> {
        self.collector.get()
    }

    pub fn handle_manager(&self) -> Option<&HandleManagerHandle> {
        self.handle_manager.get()
    }

    /// Version the implementation reported, kept even when validation
    /// subsequently rejected it.
    pub fn version_info(&self) -> Option<&InterfaceVersion> {
        self.version.get()
    }

    pub fn is_active(&self) -> bool {
        self.collector.get().is_some()
    }

    /// Locate, validate, and initialize a collector, then publish it.
    ///
    /// With a module path the implementation is loaded from that module;
    /// without one the linked collector is used. Panics if activation was
    /// already attempted on this host.
    pub fn activate(&self, module: Option<&Path>) -> Result<CollectorHandle, ActivationError> {
        self.begin();
        let outcome = match module {
            Some(path) => StandaloneProvider::load(path).map(Provider::from),
            None => Ok(Provider::from(LinkedProvider::new())),
        }
        .and_then(|provider| self.run(&provider));
        if let Err(error) = &outcome {
            error!(%error, "collector activation failed");
        }
        outcome
    }

    /// [`CollectorHost::activate`] with a caller-supplied provider.
    pub fn activate_with<P: CollectorProvider>(
        &self,
        provider: P,
    ) -> Result<CollectorHandle, ActivationError> {
        self.begin();
        let outcome = self.run(&provider);
        if let Err(error) = &outcome {
            error!(%error, origin = %provider.origin(), "collector activation failed");
        }
        outcome
    }

    /// Record a request to change event enablement.
    ///
    /// Callable from any thread at any time. Before activation the
    /// request parks in the stash; afterwards it also reaches the
    /// collector before this call returns.
    pub fn record_event_state_change(
        &self,
        provider: EventProvider,
        keywords: EventKeywords,
        level: EventLevel,
    ) {
        // Stash first, unconditionally. The exchange also fences this
        // thread against the publish and drain: if the drain already
        // swapped this slot, the handle load below observes the publish.
        self.stash.record(provider, keywords, level);
        if let Some(collector) = self.collector.get() {
            let _guard = self.event_lock.lock();
            collector.control_events(provider, keywords, level);
        }
    }

    fn begin(&self) {
        let raced = self.status.compare_exchange(
            ActivationStatus::NotStarted as u8,
            ActivationStatus::Started as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        assert!(
            raced.is_ok(),
            "collector activation may only be attempted once per host"
        );
    }

    fn advance(&self, status: ActivationStatus) {
        // Monotonic; diagnostics only.
        self.status.fetch_max(status as u8, Ordering::AcqRel);
    }

    fn run<P: CollectorProvider>(&self, provider: &P) -> Result<CollectorHandle, ActivationError> {
        self.advance(ActivationStatus::ModuleLocated);

        let version = provider.report_version()?;
        self.advance(ActivationStatus::VersionObtained);
        let _ = self.version.set(version.clone());

        version.validate(self.expected_major, self.expected_minor)?;
        self.advance(ActivationStatus::VersionValidated);
        info!(collector = %version, origin = %provider.origin(), "collector identified");

        provider.locate_initialize()?;
        self.advance(ActivationStatus::EntryPointLocated);

        let initialized = provider.initialize(Arc::clone(&self.callbacks))?;
        let handle = self.publish(initialized);
        self.advance(ActivationStatus::Complete);
        info!("collector activation complete");
        Ok(handle)
    }

    fn publish(&self, initialized: InitializedCollector) -> CollectorHandle {
        let handle = initialized.collector.clone();
        let guard = self.event_lock.lock();
        // Release-publish. A reconfiguring thread that observes the handle
        // blocks on the lock until the drain below finishes, so its direct
        // forward lands after the drained state.
        let _ = self.collector.set(initialized.collector);
        let _ = self.handle_manager.set(initialized.handle_manager);
        for provider in EventProvider::ALL {
            let (keywords, level) = self.stash.take_and_clear(provider);
            handle.control_events(provider, keywords, level);
        }
        drop(guard);
        handle
    }
}
