//! Host configuration sourced from the process environment.
//!
//! Every key is read from the environment under the `GCHOST_` prefix.
//! Integer lookups are memoized: the first read of a key decides its value
//! for the life of the process, so collectors can poll configuration on hot
//! paths without re-reading the environment.

use std::env;
use std::path::PathBuf;

use dashmap::DashMap;

/// Environment variable prefix for all host configuration keys.
pub const ENV_PREFIX: &str = "GCHOST_";

/// Key naming the standalone collector module to load, if any.
pub const COLLECTOR_PATH_KEY: &str = "COLLECTOR_PATH";

pub struct HostConfig {
    values: DashMap<String, Option<i64>>,
}

impl HostConfig {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Path of the standalone collector module named in the environment.
    ///
    /// Not memoized; activation reads this exactly once.
    pub fn collector_module(&self) -> Option<PathBuf> {
        env::var_os(format!("{ENV_PREFIX}{COLLECTOR_PATH_KEY}")).map(PathBuf::from)
    }

    /// Integer-valued configuration lookup.
    ///
    /// Returns `None` when the variable is unset or does not parse. The
    /// first observation of a key is cached; later environment changes are
    /// not picked up.
    pub fn value(&self, key: &str) -> Option<i64> {
        if let Some(cached) = self.values.get(key) {
            return *cached;
        }
        let parsed = env::var(format!("{ENV_PREFIX}{key}"))
            .ok()
            .and_then(|raw| parse_value(&raw));
        *self.values.entry(key.to_owned()).or_insert(parsed)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}
