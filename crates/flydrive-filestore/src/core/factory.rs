//! Object store client factory for the remote drivers.
//!
//! Builds `object_store` clients from the typed S3 and GCS disk configs.
//! Building a client only prepares it; no request is sent until the first
//! storage operation.
//!
//! # Timeout Configuration
//!
//! Timeouts are configured programmatically via `ClientOptions` from the disk config:
//! - `request_timeout_secs` - timeout for S3/GCS operations (default: 60s)
//! - `connect_timeout_secs` - timeout for connection establishment (default: 10s)

use crate::gcs::GoogleCloudStorageConfig;
use crate::s3::AmazonS3StorageConfig;
use flydrive_commons::{DriveError, InvalidConfig, Result};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::gcp::{GoogleCloudStorage as GcsClient, GoogleCloudStorageBuilder};
use object_store::ClientOptions;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Build ClientOptions with timeouts from the disk configuration.
fn build_client_options(
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
) -> ClientOptions {
    ClientOptions::new()
        .with_timeout(Duration::from_secs(
            request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ))
        .with_connect_timeout(Duration::from_secs(
            connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ))
}

fn driver_config_error(driver: &str, message: String) -> InvalidConfig {
    InvalidConfig::DriverConfig {
        driver: driver.to_string(),
        message,
    }
}

pub(crate) fn build_s3_client(cfg: &AmazonS3StorageConfig) -> Result<AmazonS3> {
    let bucket = cfg.bucket.trim();
    if bucket.is_empty() {
        return Err(driver_config_error("s3", "bucket cannot be empty".into()).into());
    }

    // Start with bucket name
    let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);

    // Always set region (even for S3-compatible)
    let region = cfg.region.as_deref().unwrap_or(DEFAULT_S3_REGION);
    builder = builder.with_region(region);

    // Set endpoint for S3-compatible services
    if let Some(endpoint) = &cfg.endpoint {
        builder = builder.with_endpoint(endpoint);
        // Ensure path-style requests for custom endpoints like MinIO or Spaces
        builder = builder.with_virtual_hosted_style_request(false);
    }

    // Enable HTTP if specified (needed for local/MinIO)
    if cfg.allow_http {
        builder = builder.with_allow_http(true);
    }

    // Set credentials
    if let Some(key) = &cfg.key {
        builder = builder.with_access_key_id(key);
    }
    if let Some(secret) = &cfg.secret {
        builder = builder.with_secret_access_key(secret);
    }
    if let Some(token) = &cfg.session_token {
        builder = builder.with_token(token);
    }

    builder = builder.with_client_options(build_client_options(
        cfg.request_timeout_secs,
        cfg.connect_timeout_secs,
    ));

    builder
        .build()
        .map_err(|e| DriveError::from(driver_config_error("s3", e.to_string())))
}

pub(crate) fn build_gcs_client(cfg: &GoogleCloudStorageConfig) -> Result<GcsClient> {
    let bucket = cfg.bucket.trim();
    if bucket.is_empty() {
        return Err(driver_config_error("gcs", "bucket cannot be empty".into()).into());
    }

    let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);

    if let Some(path) = &cfg.key_filename {
        builder = builder.with_service_account_path(path);
    }
    if let Some(credentials) = &cfg.credentials {
        builder = builder.with_service_account_key(credentials.to_string());
    }

    builder = builder.with_client_options(build_client_options(
        cfg.request_timeout_secs,
        cfg.connect_timeout_secs,
    ));

    builder
        .build()
        .map_err(|e| DriveError::from(driver_config_error("gcs", e.to_string())))
}
