//! # flydrive
//!
//! A uniform disk abstraction over local, S3-compatible and Google Cloud
//! storage.
//!
//! ```rust,ignore
//! use flydrive::{StorageManager, StorageManagerConfig};
//!
//! let config = StorageManagerConfig::from_file("storage.toml")?;
//! flydrive::logging::init_logging(&config.logging)?;
//!
//! let manager = StorageManager::with_builtin_drivers(config);
//! let disk = manager.disk(None)?;
//! disk.put("avatars/1.png", bytes.into()).await?;
//! ```

pub mod logging;

pub use flydrive_commons::{
    paths, BackendError, ByteStream, ContentResponse, DeleteResponse, DiskHandle, DriveError,
    Encoding, ErrorKind, ExistsResponse, FileListResponse, FileListStream, InvalidConfig,
    PutContent, PutOptions, RawResponse, Response, Result, SignedUrlOptions, SignedUrlResponse,
    StatResponse, Storage,
};
pub use flydrive_configs::{DiskConfig, LoggingSettings, StorageManagerConfig};
pub use flydrive_filestore::{
    AmazonS3Storage, AmazonS3StorageConfig, GoogleCloudStorage, GoogleCloudStorageConfig,
    LocalFileSystemStorage, LocalFileSystemStorageConfig, MemoryStorage, MemoryStorageConfig,
};
pub use flydrive_registry::{DriverFactory, StorageManager};
