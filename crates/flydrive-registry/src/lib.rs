//! # flydrive-registry
//!
//! The [`StorageManager`]: named disk configurations, driver factories keyed
//! by driver name, and a cache of disks instantiated on first use.

pub mod drivers;
pub mod manager;

pub use drivers::DriverFactory;
pub use manager::StorageManager;
