//! Unified object_store operations for the remote and in-memory disks.
//!
//! The S3, GCS and memory adapters only differ in how they are constructed,
//! how they build URLs and how much they can tell about a delete. Everything
//! else (read, write, list, copy, metadata) goes through [`ObjectStoreOps`].

use crate::core::errors::map_object_store_error;
use bytes::Bytes;
use flydrive_commons::paths::{normalize_location, prefix_directory, validate_list_prefix};
use flydrive_commons::{
    ByteStream, ContentResponse, DeleteResponse, DriveError, ExistsResponse, FileListResponse,
    FileListStream, PutContent, PutOptions, RawResponse, Response, Result, SignedUrlOptions,
    SignedUrlResponse, StatResponse,
};
use futures_util::{future, StreamExt, TryStreamExt};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions as StorePutOptions, PutPayload,
};
use std::sync::Arc;

/// How much a backend can tell about a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReporting {
    /// Deleting a missing object succeeds silently (`was_deleted = None`).
    Unknown,
    /// A missing object is reported as `NotFound` by the backend.
    Definite,
    /// The backend says nothing, so the object is looked up first.
    HeadFirst,
}

#[derive(Debug, Clone)]
pub struct ObjectStoreOps {
    store: Arc<dyn ObjectStore>,
    bucket: Option<String>,
    delete_reporting: DeleteReporting,
}

impl ObjectStoreOps {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: Option<String>,
        delete_reporting: DeleteReporting,
    ) -> Self {
        Self {
            store,
            bucket,
            delete_reporting,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn error_for(&self, location: &str) -> impl Fn(object_store::Error) -> DriveError + '_ {
        let location = location.to_string();
        move |e| map_object_store_error(e, &location, self.bucket.as_deref())
    }

    /// Object key for a location. Empty keys never name an object.
    pub fn key(&self, location: &str) -> Result<Path> {
        let normalized = normalize_location(location)?;
        if normalized.is_empty() {
            return Err(DriveError::wrong_key_path(location, "Location is empty"));
        }
        Path::parse(&normalized).map_err(|e| DriveError::wrong_key_path(location, e))
    }

    pub async fn exists(&self, location: &str) -> Result<ExistsResponse> {
        let key = self.key(location)?;
        match self.store.head(&key).await {
            Ok(meta) => Ok(ExistsResponse::new(true, RawResponse::new(meta))),
            Err(object_store::Error::NotFound { .. }) => {
                Ok(ExistsResponse::new(false, RawResponse::none()))
            }
            Err(e) => Err(self.error_for(location)(e)),
        }
    }

    pub async fn get_buffer(&self, location: &str) -> Result<ContentResponse<Bytes>> {
        let key = self.key(location)?;
        let result = self.store.get(&key).await.map_err(self.error_for(location))?;
        let meta = result.meta.clone();
        let bytes = result.bytes().await.map_err(self.error_for(location))?;
        Ok(ContentResponse::new(bytes, RawResponse::new(meta)))
    }

    pub async fn get_stream(&self, location: &str) -> Result<ByteStream> {
        let key = self.key(location)?;
        let result = self.store.get(&key).await.map_err(self.error_for(location))?;

        let location = location.to_string();
        let bucket = self.bucket.clone();
        Ok(result
            .into_stream()
            .map_err(move |e| map_object_store_error(e, &location, bucket.as_deref()))
            .boxed())
    }

    pub async fn get_stat(&self, location: &str) -> Result<StatResponse> {
        let key = self.key(location)?;
        let meta = self.store.head(&key).await.map_err(self.error_for(location))?;
        Ok(StatResponse::new(
            meta.size as u64,
            meta.last_modified,
            RawResponse::new(meta),
        ))
    }

    pub async fn put(
        &self,
        location: &str,
        content: PutContent,
        options: PutOptions,
    ) -> Result<Response> {
        let key = self.key(location)?;
        let bytes = content.into_bytes().await?;
        let opts = StorePutOptions {
            attributes: attributes_from(&options),
            ..Default::default()
        };

        let result = self
            .store
            .put_opts(&key, PutPayload::from(bytes), opts)
            .await
            .map_err(self.error_for(location))?;
        Ok(Response::new(RawResponse::new(result)))
    }

    pub async fn delete(&self, location: &str) -> Result<DeleteResponse> {
        let key = self.key(location)?;

        if self.delete_reporting == DeleteReporting::HeadFirst {
            let exists = self.exists(location).await?.exists;
            if !exists {
                return Ok(DeleteResponse::new(Some(false), RawResponse::none()));
            }
        }

        match self.store.delete(&key).await {
            Ok(()) => {
                let was_deleted = match self.delete_reporting {
                    DeleteReporting::Unknown => None,
                    DeleteReporting::Definite | DeleteReporting::HeadFirst => Some(true),
                };
                Ok(DeleteResponse::new(was_deleted, RawResponse::none()))
            }
            Err(object_store::Error::NotFound { .. }) => {
                let was_deleted = match self.delete_reporting {
                    DeleteReporting::Unknown => None,
                    DeleteReporting::Definite | DeleteReporting::HeadFirst => Some(false),
                };
                Ok(DeleteResponse::new(was_deleted, RawResponse::none()))
            }
            Err(e) => Err(self.error_for(location)(e)),
        }
    }

    pub async fn copy(&self, src: &str, dest: &str) -> Result<Response> {
        let from = self.key(src)?;
        let to = self.key(dest)?;
        self.store.copy(&from, &to).await.map_err(self.error_for(src))?;
        Ok(Response::default())
    }

    pub async fn rename(&self, src: &str, dest: &str) -> Result<Response> {
        let from = self.key(src)?;
        let to = self.key(dest)?;
        self.store.rename(&from, &to).await.map_err(self.error_for(src))?;
        Ok(Response::default())
    }

    /// Every object whose key starts with `prefix`.
    ///
    /// Object store listings are segment based, so the deepest directory named
    /// by the prefix is listed and the result filtered on the full prefix.
    pub fn flat_list(&self, prefix: &str) -> Result<FileListStream<'_>> {
        let prefix = validate_list_prefix(prefix)?;
        let directory = prefix_directory(&prefix);
        let list_root = if directory.is_empty() {
            None
        } else {
            Some(Path::parse(directory).map_err(|e| DriveError::wrong_key_path(&prefix, e))?)
        };

        let bucket = self.bucket.clone();
        let error_path = prefix.clone();
        let stream = self
            .store
            .list(list_root.as_ref())
            .map_err(move |e| map_object_store_error(e, &error_path, bucket.as_deref()))
            .try_filter(move |meta| future::ready(meta.location.as_ref().starts_with(&prefix)))
            .map_ok(|meta| {
                FileListResponse::new(meta.location.to_string(), RawResponse::new(meta))
            });

        Ok(stream.boxed())
    }

    pub async fn signed_url<S>(
        &self,
        signer: &S,
        location: &str,
        options: SignedUrlOptions,
    ) -> Result<SignedUrlResponse>
    where
        S: Signer + ?Sized,
    {
        let key = self.key(location)?;
        let url = signer
            .signed_url(http::Method::GET, &key, options.expires_in())
            .await
            .map_err(self.error_for(location))?;
        Ok(SignedUrlResponse::new(url.to_string(), RawResponse::new(url)))
    }
}

/// Object attributes for the put options a backend can store.
fn attributes_from(options: &PutOptions) -> Attributes {
    let mut attributes = Attributes::new();
    let pairs = [
        (Attribute::ContentType, &options.content_type),
        (Attribute::CacheControl, &options.cache_control),
        (Attribute::ContentDisposition, &options.content_disposition),
        (Attribute::ContentEncoding, &options.content_encoding),
    ];
    for (attribute, value) in pairs {
        if let Some(value) = value {
            attributes.insert(attribute, value.clone().into());
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use flydrive_commons::ErrorKind;
    use object_store::memory::InMemory;

    fn ops(reporting: DeleteReporting) -> ObjectStoreOps {
        ObjectStoreOps::new(Arc::new(InMemory::new()), Some("media".into()), reporting)
    }

    async fn list_paths(ops: &ObjectStoreOps, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = ops
            .flat_list(prefix)
            .unwrap()
            .map_ok(|entry| entry.path)
            .try_collect()
            .await
            .unwrap();
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn test_put_get_roundtrip_and_stat() {
        let ops = ops(DeleteReporting::Definite);
        ops.put("/docs/a.txt", "hello".into(), PutOptions::default())
            .await
            .unwrap();

        let buffer = ops.get_buffer("docs/a.txt").await.unwrap();
        assert_eq!(buffer.content, Bytes::from("hello"));
        let meta = buffer.raw.downcast_ref::<object_store::ObjectMeta>().unwrap();
        assert_eq!(meta.location.as_ref(), "docs/a.txt");

        let stat = ops.get_stat("docs/a.txt").await.unwrap();
        assert_eq!(stat.size, 5);
    }

    #[tokio::test]
    async fn test_get_missing_is_file_not_found() {
        let ops = ops(DeleteReporting::Definite);
        let err = ops.get_buffer("nope.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.path(), Some("nope.txt"));
    }

    #[tokio::test]
    async fn test_exists_never_errors_on_absence() {
        let ops = ops(DeleteReporting::Definite);
        assert!(!ops.exists("a.txt").await.unwrap().exists);
        ops.put("a.txt", "x".into(), PutOptions::default()).await.unwrap();
        assert!(ops.exists("a.txt").await.unwrap().exists);
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_complete() {
        let ops = ops(DeleteReporting::Definite);
        ops.put("big.bin", vec![7u8; 4096].into(), PutOptions::default())
            .await
            .unwrap();
        let chunks: Vec<Bytes> = ops
            .get_stream("big.bin")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 4096);
    }

    #[tokio::test]
    async fn test_delete_reporting_modes() {
        let head_first = ops(DeleteReporting::HeadFirst);
        head_first.put("a", "x".into(), PutOptions::default()).await.unwrap();
        assert_eq!(head_first.delete("a").await.unwrap().was_deleted, Some(true));
        assert_eq!(head_first.delete("a").await.unwrap().was_deleted, Some(false));

        let unknown = ops(DeleteReporting::Unknown);
        unknown.put("a", "x".into(), PutOptions::default()).await.unwrap();
        assert_eq!(unknown.delete("a").await.unwrap().was_deleted, None);
        assert!(!unknown.exists("a").await.unwrap().exists);
    }

    #[tokio::test]
    async fn test_copy_and_rename() {
        let ops = ops(DeleteReporting::Definite);
        ops.put("src.txt", "data".into(), PutOptions::default()).await.unwrap();

        ops.copy("src.txt", "copy.txt").await.unwrap();
        assert!(ops.exists("src.txt").await.unwrap().exists);

        ops.rename("copy.txt", "moved/dest.txt").await.unwrap();
        assert!(!ops.exists("copy.txt").await.unwrap().exists);
        let moved = ops.get_buffer("moved/dest.txt").await.unwrap();
        assert_eq!(moved.content, Bytes::from("data"));
    }

    #[tokio::test]
    async fn test_flat_list_uses_string_prefix() {
        let ops = ops(DeleteReporting::Definite);
        for key in ["logs/2024-01.txt", "logs/2024-02.txt", "logs/2023-12.txt", "other.txt"] {
            ops.put(key, "x".into(), PutOptions::default()).await.unwrap();
        }

        assert_eq!(
            list_paths(&ops, "logs/2024-").await,
            vec!["logs/2024-01.txt", "logs/2024-02.txt"]
        );
        assert_eq!(list_paths(&ops, "").await.len(), 4);
        assert!(list_paths(&ops, "missing/").await.is_empty());
        assert_eq!(
            list_paths(&ops, "logs//2024-0").await,
            vec!["logs/2024-01.txt", "logs/2024-02.txt"]
        );
    }

    #[tokio::test]
    async fn test_flat_list_rejects_dot_segments() {
        let ops = ops(DeleteReporting::Definite);
        for prefix in ["../etc", "a/./b", "a/.."] {
            let err = ops.flat_list(prefix).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
        }
    }

    #[tokio::test]
    async fn test_parent_escape_rejected() {
        let ops = ops(DeleteReporting::Definite);
        let err = ops.get_buffer("../secret").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
        let err = ops.exists("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
    }

    #[test]
    fn test_attributes_from_options() {
        let options = PutOptions::default()
            .with_content_type("text/plain")
            .with_cache_control("max-age=60");
        let attributes = attributes_from(&options);
        assert_eq!(attributes.len(), 2);
        assert_eq!(
            attributes
                .get(&Attribute::ContentType)
                .map(AsRef::<str>::as_ref),
            Some("text/plain")
        );
        assert!(attributes_from(&PutOptions::default()).is_empty());
    }
}
