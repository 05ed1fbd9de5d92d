//! The capability interface every disk implements.

use crate::error::{DriveError, Result};
use crate::models::{
    ByteStream, ContentResponse, DeleteResponse, Encoding, ExistsResponse, FileListResponse,
    PutContent, PutOptions, Response, SignedUrlOptions, SignedUrlResponse, StatResponse,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::any::Any;
use std::sync::Arc;

/// Lazily paginated listing. Each call to `flat_list` starts a new one.
pub type FileListStream<'a> = BoxStream<'a, Result<FileListResponse>>;

/// Shared handle to a resolved disk.
pub type DiskHandle = Arc<dyn Storage>;

/// Common contract implemented by every storage adapter.
///
/// Operations a backend cannot express (appending to an object, signing URLs
/// for a local directory...) keep the default implementation, which fails
/// eagerly with `MethodNotSupported`.
///
/// # Example
///
/// ```rust,ignore
/// let disk = manager.disk(None)?;
/// disk.put("avatars/1.png", bytes.into()).await?;
/// let stat = disk.get_stat("avatars/1.png").await?;
/// ```
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Driver name used in diagnostics (`"local"`, `"s3"`, ...).
    fn driver_name(&self) -> &str;

    /// Native backend client, for callers that need backend-specific features.
    fn driver(&self) -> &(dyn Any + Send + Sync);

    /// Append content to a file, creating it when missing.
    async fn append(&self, _location: &str, _content: Bytes) -> Result<Response> {
        Err(DriveError::method_not_supported("append", self.driver_name()))
    }

    /// Prepend content to a file, creating it when missing.
    async fn prepend(&self, _location: &str, _content: Bytes) -> Result<Response> {
        Err(DriveError::method_not_supported("prepend", self.driver_name()))
    }

    /// Copy a file to a new location.
    async fn copy(&self, src: &str, dest: &str) -> Result<Response>;

    /// Move a file to a new location.
    async fn move_file(&self, src: &str, dest: &str) -> Result<Response>;

    /// Delete a file. Absence is reported through `was_deleted`, not as an error.
    async fn delete(&self, location: &str) -> Result<DeleteResponse>;

    /// Whether a file (or folder, where the backend has folders) exists.
    async fn exists(&self, location: &str) -> Result<ExistsResponse>;

    /// File contents decoded as UTF-8.
    async fn get(&self, location: &str) -> Result<ContentResponse<String>> {
        self.get_with_encoding(location, Encoding::Utf8).await
    }

    /// File contents decoded with the given encoding.
    async fn get_with_encoding(
        &self,
        location: &str,
        encoding: Encoding,
    ) -> Result<ContentResponse<String>> {
        let buffer = self.get_buffer(location).await?;
        Ok(ContentResponse::new(
            encoding.decode(&buffer.content),
            buffer.raw,
        ))
    }

    /// File contents as bytes.
    async fn get_buffer(&self, location: &str) -> Result<ContentResponse<Bytes>>;

    /// File contents as a lazily consumed stream.
    async fn get_stream(&self, location: &str) -> Result<ByteStream>;

    /// Size and last modification time.
    async fn get_stat(&self, location: &str) -> Result<StatResponse>;

    /// Signed URL valid for 15 minutes.
    async fn get_signed_url(&self, location: &str) -> Result<SignedUrlResponse> {
        self.get_signed_url_with_options(location, SignedUrlOptions::default())
            .await
    }

    /// Signed URL with a custom expiry.
    async fn get_signed_url_with_options(
        &self,
        _location: &str,
        _options: SignedUrlOptions,
    ) -> Result<SignedUrlResponse> {
        Err(DriveError::method_not_supported(
            "getSignedUrl",
            self.driver_name(),
        ))
    }

    /// Public URL for a location, derived from configuration only. It does not
    /// check that the file exists or is readable.
    fn get_url(&self, _location: &str) -> Result<String> {
        Err(DriveError::method_not_supported("getUrl", self.driver_name()))
    }

    /// Create or replace a file. Intermediate directories are created on the fly.
    async fn put(&self, location: &str, content: PutContent) -> Result<Response> {
        self.put_with_options(location, content, PutOptions::default())
            .await
    }

    /// Create or replace a file with backend-specific options.
    async fn put_with_options(
        &self,
        location: &str,
        content: PutContent,
        options: PutOptions,
    ) -> Result<Response>;

    /// Every file whose path starts with `prefix`.
    ///
    /// Prefixes containing `.` or `..` segments are rejected with `WrongKeyPath`
    /// before anything is listed. A prefix matching nothing yields an empty stream.
    fn flat_list(&self, prefix: &str) -> Result<FileListStream<'_>>;
}
