use thiserror::Error;

/// Terminal failures from collector activation.
///
/// A collector reporting a lower interface minor version is not represented
/// here: that case is warning-class and only logged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActivationError {
    #[error("Failed to load collector module '{path}': {reason}")]
    ModuleLoadFailed { path: String, reason: String },

    #[error("Collector module is missing entry point '{0}'")]
    EntryPointMissing(String),

    #[error("Collector reports interface major version {found}, host requires exactly {expected}")]
    IncompatibleMajorVersion { expected: u32, found: u32 },

    #[error("Collector initialization failed with code {0:#010x}")]
    InitializationFailed(i32),
}
