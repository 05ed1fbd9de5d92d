//! Google Cloud Storage disk.

use crate::core::factory::build_gcs_client;
use crate::object_store_ops::{DeleteReporting, ObjectStoreOps};
use async_trait::async_trait;
use bytes::Bytes;
use flydrive_commons::paths::normalize_location;
use flydrive_commons::{
    ByteStream, ContentResponse, DeleteResponse, ExistsResponse, FileListStream, PutContent,
    PutOptions, Response, Result, SignedUrlOptions, SignedUrlResponse, StatResponse, Storage,
};
use object_store::gcp::GoogleCloudStorage as GcsClient;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

pub const DRIVER_NAME: &str = "gcs";
pub const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Disk settings for the `gcs` driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoogleCloudStorageConfig {
    pub bucket: String,
    /// Path to a service account key file
    #[serde(default, alias = "keyFilename")]
    pub key_filename: Option<String>,
    /// Inline service account key
    #[serde(default)]
    pub credentials: Option<serde_json::Value>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug)]
pub struct GoogleCloudStorage {
    config: GoogleCloudStorageConfig,
    client: Arc<GcsClient>,
    ops: ObjectStoreOps,
}

impl GoogleCloudStorage {
    pub fn new(config: GoogleCloudStorageConfig) -> Result<Self> {
        let client = Arc::new(build_gcs_client(&config)?);
        let ops = ObjectStoreOps::new(
            client.clone(),
            Some(config.bucket.clone()),
            DeleteReporting::Definite,
        );
        Ok(Self {
            config,
            client,
            ops,
        })
    }

    pub fn config(&self) -> &GoogleCloudStorageConfig {
        &self.config
    }
}

pub fn gcs_url(bucket: &str, location: &str) -> Result<String> {
    let location = normalize_location(location)?;
    Ok(format!("{}/{}/{}", PUBLIC_HOST, bucket, location))
}

#[async_trait]
impl Storage for GoogleCloudStorage {
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
        gcs_url(&self.config.bucket, location)
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
