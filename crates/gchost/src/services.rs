use std::path::PathBuf;

use gchost_events::EventSink;
use gchost_utils::sync::Arc;

use crate::collector::HostCallbacks;
use crate::config::HostConfig;

/// Concrete host-side service bundle handed to collectors as their
/// callback surface.
pub struct HostServices {
    config: HostConfig,
    sink: Arc<dyn EventSink>,
}

impl HostServices {
    pub fn new(config: HostConfig, sink: Arc<dyn EventSink>) -> Self {
        HostServices { config, sink }
    }

    /// Services backed by process environment configuration.
    pub fn from_env(sink: Arc<dyn EventSink>) -> Self {
        HostServices::new(HostConfig::new(), sink)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Path of the standalone collector module, if one is configured.
    pub fn collector_module(&self) -> Option<PathBuf> {
        self.config.collector_module()
    }
}

impl HostCallbacks for HostServices {
    fn config_value(&self, key: &str) -> Option<i64> {
        self.config.value(key)
    }

    fn record_event(&self, name: &str, payload: &[u8]) {
        self.sink.record(name, payload);
    }
}
