//! Response types returned by disk operations.
//!
//! Every response carries a [`RawResponse`] holding whatever the backend
//! natively returned, so callers can introspect backend details without the
//! shared shapes depending on any backend crate.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Backend-native response attached to every result.
#[derive(Clone, Default)]
pub struct RawResponse {
    inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl RawResponse {
    /// A response with nothing attached.
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Wrap a native backend value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the native value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            Some(_) => f.write_str("RawResponse(<native>)"),
            None => f.write_str("RawResponse(None)"),
        }
    }
}

/// Result of operations with no payload of their own (put, copy, move...).
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub raw: RawResponse,
}

impl Response {
    pub fn new(raw: RawResponse) -> Self {
        Self { raw }
    }
}

/// Result of an existence check
#[derive(Debug, Clone)]
pub struct ExistsResponse {
    pub exists: bool,
    pub raw: RawResponse,
}

impl ExistsResponse {
    pub fn new(exists: bool, raw: RawResponse) -> Self {
        Self { exists, raw }
    }
}

/// Result of a read, either decoded text or raw bytes
#[derive(Debug, Clone)]
pub struct ContentResponse<T> {
    pub content: T,
    pub raw: RawResponse,
}

impl<T> ContentResponse<T> {
    pub fn new(content: T, raw: RawResponse) -> Self {
        Self { content, raw }
    }
}

impl ContentResponse<Bytes> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Result of a delete.
///
/// `was_deleted` is `Some(true)` when a file was removed, `Some(false)` when
/// there was nothing to remove, and `None` when the backend cannot tell.
#[derive(Debug, Clone)]
pub struct DeleteResponse {
    pub was_deleted: Option<bool>,
    pub raw: RawResponse,
}

impl DeleteResponse {
    pub fn new(was_deleted: Option<bool>, raw: RawResponse) -> Self {
        Self { was_deleted, raw }
    }
}

/// Result of a signed URL request
#[derive(Debug, Clone)]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub raw: RawResponse,
}

impl SignedUrlResponse {
    pub fn new(signed_url: String, raw: RawResponse) -> Self {
        Self { signed_url, raw }
    }
}

/// Size and modification time of a file
#[derive(Debug, Clone)]
pub struct StatResponse {
    /// Size in bytes
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub raw: RawResponse,
}

impl StatResponse {
    pub fn new(size: u64, modified: DateTime<Utc>, raw: RawResponse) -> Self {
        Self {
            size,
            modified,
            raw,
        }
    }
}

/// One entry yielded by a flat listing
#[derive(Debug, Clone)]
pub struct FileListResponse {
    /// Path relative to the disk root, `/` separated
    pub path: String,
    pub raw: RawResponse,
}

impl FileListResponse {
    pub fn new(path: String, raw: RawResponse) -> Self {
        Self { path, raw }
    }
}
