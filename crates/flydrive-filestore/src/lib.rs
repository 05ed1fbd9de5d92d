//! # flydrive-filestore
//!
//! Disk adapters implementing [`flydrive_commons::Storage`]:
//! - [`LocalFileSystemStorage`]: a directory on the local filesystem
//! - [`AmazonS3Storage`]: S3 and S3-compatible services
//! - [`GoogleCloudStorage`]: Google Cloud Storage
//! - [`MemoryStorage`]: in-process, for tests and scratch data
//!
//! ## Architecture
//!
//! The object store backed adapters share [`ObjectStoreOps`]; they only differ
//! in client construction (`core::factory`), URL building and delete
//! reporting. Native errors are translated into `DriveError` kinds in one
//! place. Nobody outside this crate depends on `object_store`.

pub mod core;
pub mod gcs;
pub mod local;
pub mod memory;
pub mod object_store_ops;
pub mod s3;

pub use gcs::{GoogleCloudStorage, GoogleCloudStorageConfig};
pub use local::{LocalFileSystemStorage, LocalFileSystemStorageConfig};
pub use memory::{MemoryStorage, MemoryStorageConfig};
pub use object_store_ops::{DeleteReporting, ObjectStoreOps};
pub use s3::{AmazonS3Storage, AmazonS3StorageConfig};
