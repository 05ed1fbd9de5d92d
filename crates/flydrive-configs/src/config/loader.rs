use super::defaults::{VALID_LOG_FORMATS, VALID_LOG_LEVELS};
use super::types::StorageManagerConfig;
use std::env;
use std::fs;
use std::path::Path;

impl StorageManagerConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension
    /// (anything other than `.json` is parsed as TOML).
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: StorageManagerConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let mut config: StorageManagerConfig = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
        config.finalize()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - FLYDRIVE_DEFAULT_DISK: Override default
    /// - FLYDRIVE_LOG_LEVEL: Override logging.level
    /// - FLYDRIVE_LOG_FORMAT: Override logging.format
    ///
    /// Call `finalize()` afterwards to re-validate.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(disk) = env::var("FLYDRIVE_DEFAULT_DISK") {
            self.default = Some(disk);
        }

        if let Ok(level) = env::var("FLYDRIVE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Ok(format) = env::var("FLYDRIVE_LOG_FORMAT") {
            self.logging.format = format.to_lowercase();
        }

        Ok(())
    }

    /// Normalize values and validate configuration.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if let Some(default) = self.default.as_mut() {
            *default = default.trim().to_string();
        }

        for (name, disk) in &self.disks {
            if disk.driver.trim().is_empty() {
                // Not fatal here: the disk fails when it is resolved.
                log::warn!("Disk '{}' has no driver configured", name);
            }
        }

        self.validate()
    }

    /// Validate configuration settings
    ///
    /// Disk references are deliberately not checked here: a default naming an
    /// unknown disk or a disk using an unregistered driver only fails when that
    /// disk is resolved.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(default) = &self.default {
            if default.is_empty() {
                return Err(anyhow::anyhow!("default disk name cannot be empty"));
            }
        }

        for name in self.disks.keys() {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("disk names cannot be empty"));
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_LOG_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LOG_LEVELS.join(", ")
                ));
            }
        }

        Ok(())
    }
}
