//! The C boundary shared with standalone collector modules.
//!
//! A module exports exactly two symbols. [`VERSION_SYMBOL`] fills a
//! [`RawVersionInfo`] so the host can check compatibility before running
//! any module code with consequences. [`INITIALIZE_SYMBOL`] receives the
//! host callback table and, on success, fills the collector and handle
//! manager vtables. Everything crossing the boundary is `repr(C)`; the
//! host treats every `ctx` pointer as opaque module state.

use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use gchost_events::{EventKeywords, EventLevel, EventProvider};
use gchost_utils::sync::Arc;
use libloading::Library;

use crate::collector::{Collector, HandleManager, HostCallbacks};
use crate::version::InterfaceVersion;

/// Export that reports the module's interface version.
pub const VERSION_SYMBOL: &[u8] = b"collector_version_info";
/// Export that constructs the module's collector.
pub const INITIALIZE_SYMBOL: &[u8] = b"collector_initialize";
/// Return code of a successful initialization.
pub const INIT_SUCCESS: i32 = 0;

pub type VersionInfoFn = unsafe extern "C" fn(*mut RawVersionInfo);
pub type InitializeFn =
    unsafe extern "C" fn(*const RawHostCallbacks, *mut RawCollector, *mut RawHandleManager) -> i32;

/// Filled in by the module's version export.
#[repr(C)]
pub struct RawVersionInfo {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub name: *const c_char,
}

impl RawVersionInfo {
    pub const fn zeroed() -> Self {
        RawVersionInfo {
            major: 0,
            minor: 0,
            build: 0,
            name: ptr::null(),
        }
    }

    /// # Safety
    ///
    /// `name` must be null or point to a NUL-terminated string that is
    /// still alive.
    pub unsafe fn to_interface_version(&self) -> InterfaceVersion {
        let name = if self.name.is_null() {
            String::new()
        } else {
            // SAFETY: non-null names are NUL-terminated by the module contract.
            unsafe { CStr::from_ptr(self.name) }
                .to_string_lossy()
                .into_owned()
        };
        InterfaceVersion {
            major: self.major,
            minor: self.minor,
            build: self.build,
            name,
        }
    }
}

/// Host services handed to the module at initialization. The module keeps
/// the table pointer and passes `ctx` back on every call.
#[repr(C)]
pub struct RawHostCallbacks {
    pub ctx: *const c_void,
    /// Integer configuration lookup; returns 0 when the key is unset.
    pub config_value: unsafe extern "C" fn(*const c_void, *const c_char) -> i64,
    pub record_event: unsafe extern "C" fn(*const c_void, *const c_char, *const u8, usize),
}

/// Collector vtable the module fills on successful initialization.
#[repr(C)]
pub struct RawCollector {
    pub ctx: *mut c_void,
    pub control_events: unsafe extern "C" fn(*mut c_void, u32, u32, u32),
    pub destroy: unsafe extern "C" fn(*mut c_void),
}

/// Handle manager vtable the module fills alongside [`RawCollector`].
#[repr(C)]
pub struct RawHandleManager {
    pub ctx: *mut c_void,
    pub destroy: unsafe extern "C" fn(*mut c_void),
}

/// Owns the callback table passed across the boundary and keeps the host
/// services behind it alive as long as the module may call back.
pub(crate) struct HostCallbackShim {
    table: Box<RawHostCallbacks>,
    // The table's ctx points into this box.
    _host: Box<Arc<dyn HostCallbacks>>,
}

impl HostCallbackShim {
    pub(crate) fn new(host: Arc<dyn HostCallbacks>) -> Self {
        let host = Box::new(host);
        let table = Box::new(RawHostCallbacks {
            ctx: &*host as *const Arc<dyn HostCallbacks> as *const c_void,
            config_value: shim_config_value,
            record_event: shim_record_event,
        });
        HostCallbackShim { table, _host: host }
    }

    /// Valid for as long as `self` is alive.
    pub(crate) fn table(&self) -> *const RawHostCallbacks {
        &*self.table
    }
}

unsafe extern "C" fn shim_config_value(ctx: *const c_void, key: *const c_char) -> i64 {
    if ctx.is_null() || key.is_null() {
        return 0;
    }
    // SAFETY: ctx was created in HostCallbackShim::new from a boxed Arc that
    // outlives the module; key is NUL-terminated by the module contract.
    let host = unsafe { &*(ctx as *const Arc<dyn HostCallbacks>) };
    let key = unsafe { CStr::from_ptr(key) }.to_string_lossy();
    host.config_value(&key).unwrap_or(0)
}

unsafe extern "C" fn shim_record_event(
    ctx: *const c_void,
    name: *const c_char,
    payload: *const u8,
    len: usize,
) {
    if ctx.is_null() || name.is_null() {
        return;
    }
    // SAFETY: same contract as shim_config_value; payload is either null or
    // a readable buffer of len bytes for the duration of the call.
    let host = unsafe { &*(ctx as *const Arc<dyn HostCallbacks>) };
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
    let payload: &[u8] = if payload.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(payload, len) }
    };
    host.record_event(&name, payload);
}

/// [`Collector`] backed by a standalone module's vtable.
pub(crate) struct LoadedCollector {
    raw: RawCollector,
    // Both must outlive the vtable: the module may call back through the
    // shim until destroy returns, and the code behind the function
    // pointers lives in the library.
    _callbacks: HostCallbackShim,
    _library: Arc<Library>,
}

impl LoadedCollector {
    pub(crate) fn new(
        raw: RawCollector,
        callbacks: HostCallbackShim,
        library: Arc<Library>,
    ) -> Self {
        LoadedCollector {
            raw,
            _callbacks: callbacks,
            _library: library,
        }
    }
}

// SAFETY: the module contract requires the vtable entries to be callable
// from any thread. The host additionally serializes control_events.
unsafe impl Send for LoadedCollector {}
unsafe impl Sync for LoadedCollector {}

impl Collector for LoadedCollector {
    fn control_events(&self, provider: EventProvider, keywords: EventKeywords, level: EventLevel) {
        // SAFETY: ctx and the entry come from a successful initialization
        // and remain valid until destroy.
        unsafe {
            (self.raw.control_events)(
                self.raw.ctx,
                provider.as_u32(),
                keywords.as_u32(),
                level.as_u32(),
            )
        }
    }
}

impl Drop for LoadedCollector {
    fn drop(&mut self) {
        // SAFETY: called exactly once; ctx is not used afterwards.
        unsafe { (self.raw.destroy)(self.raw.ctx) }
    }
}

/// [`HandleManager`] backed by a standalone module's vtable.
pub(crate) struct LoadedHandleManager {
    raw: RawHandleManager,
    _library: Arc<Library>,
}

impl LoadedHandleManager {
    pub(crate) fn new(raw: RawHandleManager, library: Arc<Library>) -> Self {
        LoadedHandleManager {
            raw,
            _library: library,
        }
    }
}

// SAFETY: same contract as LoadedCollector.
unsafe impl Send for LoadedHandleManager {}
unsafe impl Sync for LoadedHandleManager {}

impl HandleManager for LoadedHandleManager {}

impl Drop for LoadedHandleManager {
    fn drop(&mut self) {
        // SAFETY: called exactly once; ctx is not used afterwards.
        unsafe { (self.raw.destroy)(self.raw.ctx) }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use gchost_utils::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        events: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl HostCallbacks for RecordingHost {
        fn config_value(&self, key: &str) -> Option<i64> {
            (key == "HEAP_COUNT").then_some(42)
        }

        fn record_event(&self, name: &str, payload: &[u8]) {
            self.events.lock().push((name.to_string(), payload.to_vec()));
        }
    }

    #[test]
    fn test_shim_config_value_round_trip() {
        let host = Arc::new(RecordingHost::default());
        let shim = HostCallbackShim::new(host);
        let table = unsafe { &*shim.table() };

        let known = CString::new("HEAP_COUNT").unwrap();
        let missing = CString::new("SERVER_GC").unwrap();
        unsafe {
            assert_eq!((table.config_value)(table.ctx, known.as_ptr()), 42);
            assert_eq!((table.config_value)(table.ctx, missing.as_ptr()), 0);
            assert_eq!((table.config_value)(ptr::null(), known.as_ptr()), 0);
            assert_eq!((table.config_value)(table.ctx, ptr::null()), 0);
        }
    }

    #[test]
    fn test_shim_record_event_delivers_payload() {
        let host = Arc::new(RecordingHost::default());
        let shim = HostCallbackShim::new(host.clone());
        let table = unsafe { &*shim.table() };

        let name = CString::new("GCStart_V2").unwrap();
        let payload = [1u8, 2, 3];
        unsafe {
            (table.record_event)(table.ctx, name.as_ptr(), payload.as_ptr(), payload.len());
            (table.record_event)(table.ctx, name.as_ptr(), ptr::null(), 0);
        }

        let events = host.events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ("GCStart_V2".to_string(), vec![1, 2, 3]));
        assert_eq!(events[1].1, Vec::<u8>::new());
    }

    #[test]
    fn test_version_info_with_name() {
        let name = CString::new("clever").unwrap();
        let raw = RawVersionInfo {
            major: 3,
            minor: 2,
            build: 9,
            name: name.as_ptr(),
        };
        let version = unsafe { raw.to_interface_version() };
        assert_eq!(version.major, 3);
        assert_eq!(version.minor, 2);
        assert_eq!(version.build, 9);
        assert_eq!(version.name, "clever");
    }

    #[test]
    fn test_version_info_null_name() {
        let version = unsafe { RawVersionInfo::zeroed().to_interface_version() };
        assert_eq!(version.major, 0);
        assert!(version.name.is_empty());
    }
}
