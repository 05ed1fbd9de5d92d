//! Disk registry: resolves disk names to cached adapter instances.
//!
//! **Architecture**:
//! - `disk_configs`: disk name → `DiskConfig`, mutable through `add_disk`
//! - `drivers`: driver name → factory, mutable through `register_driver`
//! - `disks`: DashMap of instantiated disks, populated on first resolution
//!
//! Resolution holds the `disks` entry lock while the factory runs, so
//! concurrent first use of a disk name constructs the adapter exactly once.
//! A factory must therefore never resolve disks from the same manager.

use crate::drivers::{self, DriverFactory};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use flydrive_commons::{DiskHandle, DriveError, InvalidConfig, Result, Storage};
use flydrive_configs::{DiskConfig, StorageManagerConfig};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

pub struct StorageManager {
    default_disk: Option<String>,
    disk_configs: RwLock<HashMap<String, DiskConfig>>,
    drivers: RwLock<HashMap<String, DriverFactory>>,
    disks: DashMap<String, DiskHandle>,
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("default_disk", &self.default_disk)
            .field("disk_configs", &self.disk_configs.read().len())
            .field("drivers", &self.drivers())
            .field("disks", &self.disks())
            .finish()
    }
}

impl StorageManager {
    /// Create a manager with only the `local` driver registered.
    pub fn new(config: StorageManagerConfig) -> Self {
        let manager = Self::empty(config);
        manager.register_driver_factory(
            flydrive_filestore::local::DRIVER_NAME,
            drivers::local_factory(),
        );
        manager
    }

    /// Create a manager with every shipped driver registered
    /// (`local`, `s3`, `gcs`, `memory`).
    pub fn with_builtin_drivers(config: StorageManagerConfig) -> Self {
        let manager = Self::empty(config);
        for (name, factory) in drivers::builtin_drivers() {
            manager.register_driver_factory(name, factory);
        }
        manager
    }

    fn empty(config: StorageManagerConfig) -> Self {
        let StorageManagerConfig { default, disks, .. } = config;
        Self {
            default_disk: default.filter(|name| !name.is_empty()),
            disk_configs: RwLock::new(disks.into_iter().collect()),
            drivers: RwLock::new(HashMap::new()),
            disks: DashMap::new(),
        }
    }

    pub fn default_disk(&self) -> Option<&str> {
        self.default_disk.as_deref()
    }

    /// Resolve a disk by name, or the default disk when `name` is `None` or empty.
    ///
    /// A disk resolved once is returned from the cache on every later call,
    /// without looking at its configuration again.
    pub fn disk(&self, name: Option<&str>) -> Result<DiskHandle> {
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => self
                .default_disk
                .as_deref()
                .ok_or(InvalidConfig::MissingDiskName)?,
        };

        if let Some(disk) = self.disks.get(name) {
            return Ok(Arc::clone(disk.value()));
        }

        let disk_config = self
            .disk_configs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| InvalidConfig::MissingDiskConfig(name.to_string()))?;

        if disk_config.driver.trim().is_empty() {
            return Err(InvalidConfig::MissingDiskDriver(name.to_string()).into());
        }

        let factory = self
            .drivers
            .read()
            .get(&disk_config.driver)
            .cloned()
            .ok_or_else(|| DriveError::driver_not_supported(&disk_config.driver))?;

        match self.disks.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let disk = factory(&disk_config.config)?;
                log::debug!(
                    "Instantiated disk '{}' with driver '{}'",
                    name,
                    disk_config.driver
                );
                Ok(Arc::clone(entry.insert(disk).value()))
            }
        }
    }

    /// Add a disk configuration at runtime.
    ///
    /// Fails with `InvalidConfig::DuplicateDiskName` when the name is already
    /// configured, whether or not that disk was instantiated. The existing
    /// configuration is kept.
    pub fn add_disk(&self, name: impl Into<String>, config: DiskConfig) -> Result<()> {
        let name = name.into();
        let mut configs = self.disk_configs.write();
        if configs.contains_key(&name) {
            return Err(InvalidConfig::DuplicateDiskName(name).into());
        }
        log::debug!("Added disk '{}' (driver '{}')", name, config.driver);
        configs.insert(name, config);
        Ok(())
    }

    /// Register or replace a driver factory.
    ///
    /// Disks already instantiated with a replaced driver stay cached.
    pub fn register_driver<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<DiskHandle> + Send + Sync + 'static,
    {
        self.register_driver_factory(name, Arc::new(factory));
    }

    /// Register a driver from a typed constructor; the config blob is decoded
    /// into `C` before `constructor` runs.
    pub fn register_typed_driver<C, S, F>(&self, name: impl Into<String>, constructor: F)
    where
        C: DeserializeOwned,
        S: Storage,
        F: Fn(C) -> Result<S> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory = drivers::typed_factory(&name, constructor);
        self.register_driver_factory(name, factory);
    }

    pub fn register_driver_factory(&self, name: impl Into<String>, factory: DriverFactory) {
        let name = name.into();
        log::debug!("Registered driver '{}'", name);
        self.drivers.write().insert(name, factory);
    }

    /// Names of the instantiated disks, sorted.
    pub fn disks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.disks.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Names of the registered drivers, sorted.
    pub fn drivers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of the configured disks, sorted.
    pub fn disk_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.disk_configs.read().keys().cloned().collect();
        names.sort();
        names
    }
}
