//! S3-compatible disk (AWS S3, MinIO, DigitalOcean Spaces, ...).

use crate::core::factory::build_s3_client;
use crate::object_store_ops::{DeleteReporting, ObjectStoreOps};
use async_trait::async_trait;
use bytes::Bytes;
use flydrive_commons::paths::normalize_location;
use flydrive_commons::{
    ByteStream, ContentResponse, DeleteResponse, ExistsResponse, FileListStream, InvalidConfig,
    PutContent, PutOptions, Response, Result, SignedUrlOptions, SignedUrlResponse, StatResponse,
    Storage,
};
use object_store::aws::AmazonS3;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

pub const DRIVER_NAME: &str = "s3";

/// Disk settings for the `s3` driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmazonS3StorageConfig {
    /// Access key id. Falls back to the environment when omitted.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default, alias = "sessionToken")]
    pub session_token: Option<String>,
    pub bucket: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Build `get_url` results as `host/bucket/key` even on amazonaws.com
    #[serde(default, alias = "forcePathStyle")]
    pub force_path_style: bool,
    #[serde(default, alias = "allowHttp")]
    pub allow_http: bool,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug)]
pub struct AmazonS3Storage {
    config: AmazonS3StorageConfig,
    client: Arc<AmazonS3>,
    ops: ObjectStoreOps,
}

impl AmazonS3Storage {
    /// Prepare the S3 client. No request is sent.
    pub fn new(config: AmazonS3StorageConfig) -> Result<Self> {
        let client = Arc::new(build_s3_client(&config)?);
        let ops = ObjectStoreOps::new(
            client.clone(),
            Some(config.bucket.clone()),
            DeleteReporting::Unknown,
        );
        Ok(Self {
            config,
            client,
            ops,
        })
    }

    pub fn config(&self) -> &AmazonS3StorageConfig {
        &self.config
    }
}

/// Public URL of `location` in the configured bucket.
///
/// amazonaws.com endpoints use virtual-hosted style (`bucket.host/key`) unless
/// `force_path_style` is set; every other endpoint uses path style.
pub fn s3_url(config: &AmazonS3StorageConfig, location: &str) -> Result<String> {
    let location = normalize_location(location)?;
    let aws_host = match config.region.as_deref() {
        Some(region) => format!("s3.{}.amazonaws.com", region),
        None => "s3.amazonaws.com".to_string(),
    };
    let endpoint = match config.endpoint.as_deref() {
        Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
        _ => format!("https://{}", aws_host),
    };

    // Endpoints sometimes embed the bucket as a subdomain
    let endpoint = if config.bucket.is_empty() {
        endpoint
    } else {
        endpoint
            .replacen(config.bucket.as_str(), "", 1)
            .replace("://.", "://")
    };

    let url = url::Url::parse(&endpoint).map_err(|e| InvalidConfig::DriverConfig {
        driver: DRIVER_NAME.to_string(),
        message: format!("invalid endpoint '{}': {}", endpoint, e),
    })?;
    let mut host = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        host = format!("{}:{}", host, port);
    }
    let scheme = url.scheme();

    if url.as_str().contains("amazonaws.com") && !config.force_path_style {
        return Ok(format!("{}://{}.{}/{}", scheme, config.bucket, host, location));
    }
    Ok(format!("{}://{}/{}/{}", scheme, host, config.bucket, location))
}

#[async_trait]
impl Storage for AmazonS3Storage {
    fn driver_name(&self) -> &str {
        DRIVER_NAME
    }

    fn driver(&self) -> &(dyn Any + Send + Sync) {
        self.client.as_ref()
    }

    async fn copy(&self, src: &str, dest: &str) -> Result<Response> {
        self.ops.copy(src, dest).await
    }

    async fn move_file(&self, src: &str, dest: &str) -> Result<Response> {
        self.ops.rename(src, dest).await
    }

    async fn delete(&self, location: &str) -> Result<DeleteResponse> {
        self.ops.delete(location).await
    }

    async fn exists(&self, location: &str) -> Result<ExistsResponse> {
        self.ops.exists(location).await
    }

    async fn get_buffer(&self, location: &str) -> Result<ContentResponse<Bytes>> {
        self.ops.get_buffer(location).await
    }

    async fn get_stream(&self, location: &str) -> Result<ByteStream> {
        self.ops.get_stream(location).await
    }

    async fn get_stat(&self, location: &str) -> Result<StatResponse> {
        self.ops.get_stat(location).await
    }

    async fn get_signed_url_with_options(
        &self,
        location: &str,
        options: SignedUrlOptions,
    ) -> Result<SignedUrlResponse> {
        self.ops
            .signed_url(self.client.as_ref(), location, options)
            .await
    }

    fn get_url(&self, location: &str) -> Result<String> {
        s3_url(&self.config, location)
    }

    async fn put_with_options(
        &self,
        location: &str,
        content: PutContent,
        options: PutOptions,
    ) -> Result<Response> {
        self.ops.put(location, content, options).await
    }

    fn flat_list(&self, prefix: &str) -> Result<FileListStream<'_>> {
        self.ops.flat_list(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flydrive_commons::ErrorKind;

    fn config(json: serde_json::Value) -> AmazonS3StorageConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_config_accepts_camel_case_aliases() {
        let cfg = config(serde_json::json!({
            "bucket": "media",
            "forcePathStyle": true,
            "sessionToken": "tok",
            "allowHttp": true
        }));
        assert!(cfg.force_path_style);
        assert!(cfg.allow_http);
        assert_eq!(cfg.session_token.as_deref(), Some("tok"));
        assert!(cfg.key.is_none());
    }

    #[test]
    fn test_config_requires_bucket() {
        let err = serde_json::from_value::<AmazonS3StorageConfig>(serde_json::json!({
            "region": "eu-west-1"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_url_defaults_to_virtual_hosted_aws() {
        let cfg = config(serde_json::json!({ "bucket": "media", "region": "eu-west-1" }));
        assert_eq!(
            s3_url(&cfg, "avatars/1.png").unwrap(),
            "https://media.s3.eu-west-1.amazonaws.com/avatars/1.png"
        );

        let no_region = config(serde_json::json!({ "bucket": "media" }));
        assert_eq!(
            s3_url(&no_region, "a.txt").unwrap(),
            "https://media.s3.amazonaws.com/a.txt"
        );
    }

    #[test]
    fn test_url_force_path_style() {
        let cfg = config(serde_json::json!({
            "bucket": "media",
            "region": "us-east-1",
            "forcePathStyle": true
        }));
        assert_eq!(
            s3_url(&cfg, "a.txt").unwrap(),
            "https://s3.us-east-1.amazonaws.com/media/a.txt"
        );
    }

    #[test]
    fn test_url_custom_endpoint_uses_path_style() {
        let cfg = config(serde_json::json!({
            "bucket": "media",
            "endpoint": "https://media.ams3.digitaloceanspaces.com"
        }));
        assert_eq!(
            s3_url(&cfg, "a.txt").unwrap(),
            "https://ams3.digitaloceanspaces.com/media/a.txt"
        );

        let minio = config(serde_json::json!({
            "bucket": "media",
            "endpoint": "http://127.0.0.1:9000"
        }));
        assert_eq!(
            s3_url(&minio, "/dir/a.txt").unwrap(),
            "http://127.0.0.1:9000/media/dir/a.txt"
        );
    }

    #[test]
    fn test_url_with_bad_endpoint_is_invalid_config() {
        let cfg = config(serde_json::json!({ "bucket": "media", "endpoint": "not a url" }));
        assert_eq!(s3_url(&cfg, "a.txt").unwrap_err().kind(), ErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn test_append_is_not_supported() {
        let disk = AmazonS3Storage::new(config(serde_json::json!({
            "bucket": "media",
            "region": "eu-west-1",
            "key": "AKIAEXAMPLE",
            "secret": "secret"
        })))
        .unwrap();
        let err = disk.append("a.txt", Bytes::from("x")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotSupported);
        assert!(disk.driver().downcast_ref::<AmazonS3>().is_some());
    }

    #[tokio::test]
    async fn test_signed_url_is_generated_offline() {
        let disk = AmazonS3Storage::new(config(serde_json::json!({
            "bucket": "media",
            "region": "eu-west-1",
            "key": "AKIAEXAMPLE",
            "secret": "secret"
        })))
        .unwrap();
        let signed = disk.get_signed_url("a.txt").await.unwrap();
        assert!(signed.signed_url.contains("a.txt"));
        assert!(signed.signed_url.contains("X-Amz-Expires=900"));
    }
}
