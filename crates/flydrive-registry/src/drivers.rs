//! Driver factories and the drivers shipped with flydrive.

use flydrive_commons::{DiskHandle, InvalidConfig, Result, Storage};
use flydrive_filestore::{
    gcs, local, memory, s3, AmazonS3Storage, GoogleCloudStorage, LocalFileSystemStorage,
    MemoryStorage,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Builds a disk from the `config` blob of a disk configuration.
///
/// Factories may prepare clients but must not perform storage I/O.
pub type DriverFactory = Arc<dyn Fn(&serde_json::Value) -> Result<DiskHandle> + Send + Sync>;

/// Wrap a typed constructor into a factory that decodes the config blob first.
///
/// A blob that does not decode into `C` fails with
/// `InvalidConfig::DriverConfig` naming `driver`.
pub fn typed_factory<C, S, F>(driver: &str, constructor: F) -> DriverFactory
where
    C: DeserializeOwned,
    S: Storage,
    F: Fn(C) -> Result<S> + Send + Sync + 'static,
{
    let driver = driver.to_string();
    Arc::new(move |config: &serde_json::Value| -> Result<DiskHandle> {
        let typed: C = serde_json::from_value(config.clone()).map_err(|e| {
            InvalidConfig::DriverConfig {
                driver: driver.clone(),
                message: e.to_string(),
            }
        })?;
        let disk: DiskHandle = Arc::new(constructor(typed)?);
        Ok(disk)
    })
}

pub fn local_factory() -> DriverFactory {
    typed_factory(local::DRIVER_NAME, |cfg: local::LocalFileSystemStorageConfig| {
        Ok(LocalFileSystemStorage::new(cfg))
    })
}

pub fn s3_factory() -> DriverFactory {
    typed_factory(s3::DRIVER_NAME, AmazonS3Storage::new)
}

pub fn gcs_factory() -> DriverFactory {
    typed_factory(gcs::DRIVER_NAME, GoogleCloudStorage::new)
}

pub fn memory_factory() -> DriverFactory {
    typed_factory(memory::DRIVER_NAME, |cfg: memory::MemoryStorageConfig| {
        Ok(MemoryStorage::new(cfg))
    })
}

/// Every driver flydrive ships, by driver name.
pub fn builtin_drivers() -> Vec<(&'static str, DriverFactory)> {
    vec![
        (local::DRIVER_NAME, local_factory()),
        (s3::DRIVER_NAME, s3_factory()),
        (gcs::DRIVER_NAME, gcs_factory()),
        (memory::DRIVER_NAME, memory_factory()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flydrive_commons::ErrorKind;

    #[test]
    fn test_local_factory_requires_root() {
        let err = local_factory()(&serde_json::json!({})).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("local"));
    }

    #[test]
    fn test_local_factory_builds_disk() {
        let disk = local_factory()(&serde_json::json!({ "root": "/tmp/x" })).unwrap();
        assert_eq!(disk.driver_name(), "local");
        let root = disk.driver().downcast_ref::<std::path::PathBuf>().unwrap();
        assert_eq!(root, &std::path::PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_s3_factory_rejects_missing_bucket() {
        let err = s3_factory()(&serde_json::json!({ "region": "eu-west-1" }))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_builtin_driver_names() {
        let names: Vec<&str> = builtin_drivers().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["local", "s3", "gcs", "memory"]);
    }
}
