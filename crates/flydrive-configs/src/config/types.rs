use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Top-level configuration consumed by the storage manager.
///
/// ```toml
/// default = "local"
///
/// [disks.local]
/// driver = "local"
/// config = { root = "/var/lib/app/files" }
///
/// [disks.s3]
/// driver = "s3"
/// config = { bucket = "uploads", region = "eu-west-1", key = "...", secret = "..." }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageManagerConfig {
    /// Disk returned when no name is given
    #[serde(default)]
    pub default: Option<String>,
    /// Configured disks, keyed by disk name
    #[serde(default)]
    pub disks: BTreeMap<String, DiskConfig>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Configuration of a single named disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskConfig {
    /// Registered driver name. Left empty, resolution of the disk fails.
    #[serde(default)]
    pub driver: String,
    /// Backend-specific settings, decoded by the driver factory
    #[serde(default = "default_disk_config")]
    pub config: serde_json::Value,
}

impl DiskConfig {
    pub fn new(driver: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            driver: driver.into(),
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Optional per-target log level overrides
    /// [logging.targets]
    /// object_store = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_to_console: default_true(),
            targets: HashMap::new(),
        }
    }
}
