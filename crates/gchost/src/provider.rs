//! Locating collector implementations and bringing them to life.

use std::mem::MaybeUninit;
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use gchost_events::EventGate;
use gchost_utils::sync::{Arc, OnceLock};
use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::abi::{
    HostCallbackShim, InitializeFn, LoadedCollector, LoadedHandleManager, RawCollector,
    RawHandleManager, RawVersionInfo, VersionInfoFn, INITIALIZE_SYMBOL, INIT_SUCCESS,
    VERSION_SYMBOL,
};
use crate::builtin::{DefaultCollector, DefaultHandleManager};
use crate::collector::{HostCallbacks, InitializedCollector};
use crate::error::ActivationError;
use crate::version::InterfaceVersion;

/// A located collector implementation.
///
/// Methods are called in order: version first, then entry point
/// resolution, then a single initialization.
#[enum_dispatch]
pub trait CollectorProvider {
    /// Where the implementation comes from, for diagnostics.
    fn origin(&self) -> String;

    /// Interface version the implementation was built against.
    fn report_version(&self) -> Result<InterfaceVersion, ActivationError>;

    /// Resolve the initialization entry point without running it.
    fn locate_initialize(&self) -> Result<(), ActivationError>;

    /// Construct the collector. Called at most once, after version
    /// validation passed.
    fn initialize(
        &self,
        host: Arc<dyn HostCallbacks>,
    ) -> Result<InitializedCollector, ActivationError>;
}

/// The closed set of places a collector can come from.
#[enum_dispatch(CollectorProvider)]
pub enum Provider {
    LinkedProvider,
    StandaloneProvider,
}

/// The collector compiled into the host binary.
pub struct LinkedProvider {
    gate: Arc<EventGate>,
}

impl LinkedProvider {
    pub fn new() -> Self {
        LinkedProvider {
            gate: Arc::new(EventGate::new()),
        }
    }

    /// Shared with the collector, so the host's own event call sites can
    /// keep querying enablement after initialization.
    pub fn gate(&self) -> &Arc<EventGate> {
        &self.gate
    }
}

impl Default for LinkedProvider {
    fn default() -> Self {
        LinkedProvider::new()
    }
}

impl CollectorProvider for LinkedProvider {
    fn origin(&self) -> String {
        String::from("linked")
    }

    fn report_version(&self) -> Result<InterfaceVersion, ActivationError> {
        Ok(DefaultCollector::version())
    }

    fn locate_initialize(&self) -> Result<(), ActivationError> {
        Ok(())
    }

    fn initialize(
        &self,
        host: Arc<dyn HostCallbacks>,
    ) -> Result<InitializedCollector, ActivationError> {
        Ok(InitializedCollector {
            collector: Arc::new(DefaultCollector::new(self.gate.clone(), host)),
            handle_manager: Arc::new(DefaultHandleManager),
        })
    }
}

/// Collector loaded from a standalone dynamic module.
#[derive(Debug)]
pub struct StandaloneProvider {
    path: PathBuf,
    library: Arc<Library>,
    initialize: OnceLock<InitializeFn>,
}

impl StandaloneProvider {
    /// Load the module at `path`. Runs no module code beyond the platform
    /// loader.
    pub fn load(path: &Path) -> Result<Self, ActivationError> {
        let library =
            unsafe { Library::new(path) }.map_err(|e| ActivationError::ModuleLoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        debug!(module = %path.display(), "collector module loaded");
        Ok(StandaloneProvider {
            path: path.to_path_buf(),
            library: Arc::new(library),
            initialize: OnceLock::new(),
        })
    }

    /// Resolve an export as a bare function pointer. The pointer stays
    /// valid while `self.library` is mapped; anything that stores it keeps
    /// a clone of that Arc.
    fn symbol<T: Copy>(&self, name: &'static [u8]) -> Result<T, ActivationError> {
        let symbol: Symbol<T> = unsafe { self.library.get(name) }.map_err(|_| {
            ActivationError::EntryPointMissing(String::from_utf8_lossy(name).into_owned())
        })?;
        Ok(*symbol)
    }

    fn initialize_entry(&self) -> Result<InitializeFn, ActivationError> {
        if let Some(entry) = self.initialize.get() {
            return Ok(*entry);
        }
        let entry: InitializeFn = self.symbol(INITIALIZE_SYMBOL)?;
        Ok(*self.initialize.get_or_init(|| entry))
    }
}

impl CollectorProvider for StandaloneProvider {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn report_version(&self) -> Result<InterfaceVersion, ActivationError> {
        let version_info: VersionInfoFn = self.symbol(VERSION_SYMBOL)?;
        let mut raw = RawVersionInfo::zeroed();
        // SAFETY: the export only writes the struct it is handed.
        unsafe {
            version_info(&mut raw);
        }
        // SAFETY: any name pointer the export wrote is static module data,
        // alive while the library is mapped.
        Ok(unsafe { raw.to_interface_version() })
    }

    fn locate_initialize(&self) -> Result<(), ActivationError> {
        self.initialize_entry()?;
        Ok(())
    }

    fn initialize(
        &self,
        host: Arc<dyn HostCallbacks>,
    ) -> Result<InitializedCollector, ActivationError> {
        let entry = self.initialize_entry()?;
        let callbacks = HostCallbackShim::new(host);
        let mut collector = MaybeUninit::<RawCollector>::uninit();
        let mut handle_manager = MaybeUninit::<RawHandleManager>::uninit();
        // SAFETY: the entry reads the callback table, which the shim keeps
        // alive past this call, and writes the two out structs.
        let code = unsafe {
            entry(
                callbacks.table(),
                collector.as_mut_ptr(),
                handle_manager.as_mut_ptr(),
            )
        };
        if code != INIT_SUCCESS {
            return Err(ActivationError::InitializationFailed(code));
        }
        // SAFETY: the module contract fills both vtables on success.
        let (collector, handle_manager) =
            unsafe { (collector.assume_init(), handle_manager.assume_init()) };
        info!(module = %self.path.display(), "standalone collector initialized");
        Ok(InitializedCollector {
            collector: Arc::new(LoadedCollector::new(
                collector,
                callbacks,
                self.library.clone(),
            )),
            handle_manager: Arc::new(LoadedHandleManager::new(
                handle_manager,
                self.library.clone(),
            )),
        })
    }
}
