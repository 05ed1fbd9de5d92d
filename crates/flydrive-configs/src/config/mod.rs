pub mod defaults;
mod loader;
pub mod types;

pub use types::{DiskConfig, LoggingSettings, StorageManagerConfig};
