//! Error taxonomy shared by the registry and every storage adapter.
//!
//! Configuration and driver errors are raised by the registry at resolution
//! time. Everything else is produced by adapters, which normalize their native
//! error codes into one of the variants below and keep the native error as the
//! `source` for diagnostics.

use std::fmt;
use thiserror::Error;

/// Boxed native error carried inside a [`DriveError`].
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for disk operations.
pub type Result<T> = std::result::Result<T, DriveError>;

/// Setup mistakes detected while configuring or resolving disks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfig {
    #[error("Make sure to define a default disk name inside config file")]
    MissingDiskName,

    #[error("Make sure to define config for {0} disk")]
    MissingDiskConfig(String),

    #[error("Make sure to define driver for {0} disk")]
    MissingDiskDriver(String),

    #[error("A disk named {0} is already defined")]
    DuplicateDiskName(String),

    #[error("Invalid config for driver {driver}: {message}")]
    DriverConfig { driver: String, message: String },
}

/// Flat tag for a [`DriveError`], convenient for matching and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfig,
    DriverNotSupported,
    FileNotFound,
    NoSuchBucket,
    PermissionMissing,
    AuthorizationRequired,
    WrongKeyPath,
    UnknownException,
    MethodNotSupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidConfig => "InvalidConfig",
            ErrorKind::DriverNotSupported => "DriverNotSupported",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::NoSuchBucket => "NoSuchBucket",
            ErrorKind::PermissionMissing => "PermissionMissing",
            ErrorKind::AuthorizationRequired => "AuthorizationRequired",
            ErrorKind::WrongKeyPath => "WrongKeyPath",
            ErrorKind::UnknownException => "UnknownException",
            ErrorKind::MethodNotSupported => "MethodNotSupported",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by disks and the storage manager.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),

    #[error("Driver {driver} is not supported")]
    DriverNotSupported { driver: String },

    #[error("The file {path} doesn't exist")]
    FileNotFound {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("The bucket {bucket} doesn't exist")]
    NoSuchBucket {
        bucket: String,
        #[source]
        source: BackendError,
    },

    #[error("Missing permission for file {path}")]
    PermissionMissing {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("Unauthorized to access file {path}")]
    AuthorizationRequired {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("The path {path} is wrong")]
    WrongKeyPath {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("An unknown error happened with the file {path} (code: {code})")]
    UnknownException {
        path: String,
        code: String,
        #[source]
        source: BackendError,
    },

    #[error("Method {method} is not supported for the driver {driver}")]
    MethodNotSupported { method: String, driver: String },
}

impl DriveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            DriveError::DriverNotSupported { .. } => ErrorKind::DriverNotSupported,
            DriveError::FileNotFound { .. } => ErrorKind::FileNotFound,
            DriveError::NoSuchBucket { .. } => ErrorKind::NoSuchBucket,
            DriveError::PermissionMissing { .. } => ErrorKind::PermissionMissing,
            DriveError::AuthorizationRequired { .. } => ErrorKind::AuthorizationRequired,
            DriveError::WrongKeyPath { .. } => ErrorKind::WrongKeyPath,
            DriveError::UnknownException { .. } => ErrorKind::UnknownException,
            DriveError::MethodNotSupported { .. } => ErrorKind::MethodNotSupported,
        }
    }

    pub fn driver_not_supported(driver: impl Into<String>) -> Self {
        DriveError::DriverNotSupported {
            driver: driver.into(),
        }
    }

    pub fn method_not_supported(method: impl Into<String>, driver: impl Into<String>) -> Self {
        DriveError::MethodNotSupported {
            method: method.into(),
            driver: driver.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DriveError::FileNotFound {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn no_such_bucket(bucket: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DriveError::NoSuchBucket {
            bucket: bucket.into(),
            source: source.into(),
        }
    }

    pub fn permission_missing(path: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DriveError::PermissionMissing {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn authorization_required(
        path: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        DriveError::AuthorizationRequired {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn wrong_key_path(path: impl Into<String>, source: impl Into<BackendError>) -> Self {
        DriveError::WrongKeyPath {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn unknown(
        path: impl Into<String>,
        code: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        DriveError::UnknownException {
            path: path.into(),
            code: code.into(),
            source: source.into(),
        }
    }

    /// The offending path, when the error is tied to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            DriveError::FileNotFound { path, .. }
            | DriveError::PermissionMissing { path, .. }
            | DriveError::AuthorizationRequired { path, .. }
            | DriveError::WrongKeyPath { path, .. }
            | DriveError::UnknownException { path, .. } => Some(path),
            _ => None,
        }
    }
}
