//! # flydrive-commons
//!
//! Types shared by every flydrive crate:
//! - the [`Storage`] capability interface implemented by each disk adapter
//! - response models carrying the backend-native `raw` value
//! - the [`DriveError`] taxonomy adapters normalize their errors into
//! - location and listing-prefix validation

pub mod error;
pub mod models;
pub mod paths;
pub mod storage;

pub use error::{BackendError, DriveError, ErrorKind, InvalidConfig, Result};
pub use models::*;
pub use storage::{DiskHandle, FileListStream, Storage};
