//! Local filesystem disk rooted at a directory.

mod listing;

use crate::core::errors::map_io_error;
use async_trait::async_trait;
use bytes::Bytes;
use flydrive_commons::paths::{normalize_location, validate_list_prefix};
use flydrive_commons::{
    ByteStream, ContentResponse, DeleteResponse, ExistsResponse, FileListStream, PutContent,
    PutOptions, RawResponse, Response, Result, StatResponse, Storage,
};
use futures_util::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

pub const DRIVER_NAME: &str = "local";

/// Disk settings for the `local` driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalFileSystemStorageConfig {
    /// Directory every location is resolved against
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LocalFileSystemStorage {
    root: PathBuf,
}

impl LocalFileSystemStorage {
    /// The root directory is not created or checked here.
    pub fn new(config: LocalFileSystemStorageConfig) -> Self {
        Self { root: config.root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a location. `..` segments are rejected.
    pub fn full_path(&self, location: &str) -> Result<PathBuf> {
        let key = normalize_location(location)?;
        Ok(self.root.join(key))
    }
}

async fn ensure_parent(path: &Path, location: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| map_io_error(e, location))?;
    }
    Ok(())
}

/// Sibling file a streamed put writes to before it is renamed into place.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

async fn write_stream(path: &Path, mut stream: ByteStream, location: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| map_io_error(e, location))?;
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?)
            .await
            .map_err(|e| map_io_error(e, location))?;
    }
    file.flush().await.map_err(|e| map_io_error(e, location))
}

#[async_trait]
impl Storage for LocalFileSystemStorage {
    fn driver_name(&self) -> &str {
        DRIVER_NAME
    }

    fn driver(&self) -> &(dyn Any + Send + Sync) {
        &self.root
    }

    async fn append(&self, location: &str, content: Bytes) -> Result<Response> {
        let path = self.full_path(location)?;
        ensure_parent(&path, location).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| map_io_error(e, location))?;
        file.write_all(&content)
            .await
            .map_err(|e| map_io_error(e, location))?;
        file.flush().await.map_err(|e| map_io_error(e, location))?;
        Ok(Response::default())
    }

    async fn prepend(&self, location: &str, content: Bytes) -> Result<Response> {
        let path = self.full_path(location)?;
        let existing = match tokio::fs::read(&path).await {
            Ok(existing) => existing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return self.put(location, content.into()).await;
            }
            Err(e) => return Err(map_io_error(e, location)),
        };

        let mut merged = Vec::with_capacity(content.len() + existing.len());
        merged.extend_from_slice(&content);
        merged.extend_from_slice(&existing);
        tokio::fs::write(&path, merged)
            .await
            .map_err(|e| map_io_error(e, location))?;
        Ok(Response::default())
    }

    async fn copy(&self, src: &str, dest: &str) -> Result<Response> {
        let from = self.full_path(src)?;
        let to = self.full_path(dest)?;
        ensure_parent(&to, dest).await?;
        tokio::fs::copy(&from, &to)
            .await
            .map_err(|e| map_io_error(e, src))?;
        Ok(Response::default())
    }

    async fn move_file(&self, src: &str, dest: &str) -> Result<Response> {
        let from = self.full_path(src)?;
        let to = self.full_path(dest)?;
        ensure_parent(&to, dest).await?;

        match tokio::fs::rename(&from, &to).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(map_io_error(e, src)),
            Err(e) => {
                // Rename cannot cross filesystems
                log::debug!("rename {} -> {} failed ({}), copying instead", src, dest, e);
                tokio::fs::copy(&from, &to)
                    .await
                    .map_err(|e| map_io_error(e, src))?;
                tokio::fs::remove_file(&from)
                    .await
                    .map_err(|e| map_io_error(e, src))?;
            }
        }
        Ok(Response::default())
    }

    async fn delete(&self, location: &str) -> Result<DeleteResponse> {
        let path = self.full_path(location)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(DeleteResponse::new(Some(true), RawResponse::none())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(DeleteResponse::new(Some(false), RawResponse::none()))
            }
            Err(e) => Err(map_io_error(e, location)),
        }
    }

    async fn exists(&self, location: &str) -> Result<ExistsResponse> {
        let path = self.full_path(location)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| map_io_error(e, location))?;
        Ok(ExistsResponse::new(exists, RawResponse::none()))
    }

    async fn get_buffer(&self, location: &str) -> Result<ContentResponse<Bytes>> {
        let path = self.full_path(location)?;
        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| map_io_error(e, location))?;
        Ok(ContentResponse::new(Bytes::from(content), RawResponse::none()))
    }

    async fn get_stream(&self, location: &str) -> Result<ByteStream> {
        let path = self.full_path(location)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| map_io_error(e, location))?;

        let location = location.to_string();
        Ok(ReaderStream::new(file)
            .map_err(move |e| map_io_error(e, &location))
            .boxed())
    }

    async fn get_stat(&self, location: &str) -> Result<StatResponse> {
        let path = self.full_path(location)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| map_io_error(e, location))?;
        let modified = meta.modified().map_err(|e| map_io_error(e, location))?;
        Ok(StatResponse::new(
            meta.len(),
            modified.into(),
            RawResponse::new(meta),
        ))
    }

    async fn put_with_options(
        &self,
        location: &str,
        content: PutContent,
        _options: PutOptions,
    ) -> Result<Response> {
        let path = self.full_path(location)?;
        ensure_parent(&path, location).await?;

        match content {
            PutContent::Bytes(bytes) => {
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| map_io_error(e, location))?;
            }
            PutContent::Stream(stream) => {
                let partial = partial_path(&path);
                if let Err(e) = write_stream(&partial, stream, location).await {
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(e);
                }
                tokio::fs::rename(&partial, &path)
                    .await
                    .map_err(|e| map_io_error(e, location))?;
            }
        }
        Ok(Response::default())
    }

    fn flat_list(&self, prefix: &str) -> Result<FileListStream<'_>> {
        let prefix = validate_list_prefix(prefix)?;
        Ok(listing::walk(self.root.clone(), prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flydrive_commons::{DriveError, Encoding, ErrorKind};
    use futures_util::stream;

    fn disk() -> (tempfile::TempDir, LocalFileSystemStorage) {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalFileSystemStorage::new(LocalFileSystemStorageConfig {
            root: dir.path().to_path_buf(),
        });
        (dir, disk)
    }

    async fn list(disk: &LocalFileSystemStorage, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = disk
            .flat_list(prefix)
            .unwrap()
            .map_ok(|e| e.path)
            .try_collect()
            .await
            .unwrap();
        paths.sort();
        paths
    }

    #[test]
    fn test_construction_does_no_io() {
        let disk = LocalFileSystemStorage::new(LocalFileSystemStorageConfig {
            root: PathBuf::from("/definitely/not/created"),
        });
        assert!(!disk.root().exists());
        assert_eq!(
            disk.full_path("./a//b.txt").unwrap(),
            PathBuf::from("/definitely/not/created/a/b.txt")
        );
    }

    #[tokio::test]
    async fn test_put_creates_intermediate_directories() {
        let (dir, disk) = disk();
        disk.put("a/b/c.txt", "hi".into()).await.unwrap();
        assert!(dir.path().join("a/b/c.txt").is_file());
        assert!(disk.exists("a/b/c.txt").await.unwrap().exists);
        assert!(disk.exists("a/b").await.unwrap().exists);

        disk.delete("a/b/c.txt").await.unwrap();
        assert!(!disk.exists("a/b/c.txt").await.unwrap().exists);
    }

    #[tokio::test]
    async fn test_roundtrip_payloads() {
        let (_dir, disk) = disk();
        for (name, text) in [("empty", ""), ("ascii", "hello"), ("utf8", "héllo wörld ✓")] {
            disk.put(name, text.into()).await.unwrap();
            assert_eq!(disk.get(name).await.unwrap().content, text);
        }

        let binary: Vec<u8> = (0..=255).collect();
        disk.put("binary", binary.clone().into()).await.unwrap();
        assert_eq!(disk.get_buffer("binary").await.unwrap().content.to_vec(), binary);
    }

    #[tokio::test]
    async fn test_put_stream_and_read_stream() {
        let (_dir, disk) = disk();
        let chunks: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ]));
        disk.put("s.bin", chunks.into()).await.unwrap();

        let read: Vec<Bytes> = disk.get_stream("s.bin").await.unwrap().try_collect().await.unwrap();
        assert_eq!(read.concat(), b"abcd");

        let hex = disk.get_with_encoding("s.bin", Encoding::Hex).await.unwrap();
        assert_eq!(hex.content, "61626364");
    }

    #[tokio::test]
    async fn test_failed_stream_put_leaves_nothing_behind() {
        let (_dir, disk) = disk();
        disk.put("kept.bin", "old".into()).await.unwrap();

        for key in ["new.bin", "kept.bin"] {
            let chunks: ByteStream = Box::pin(stream::iter(vec![
                Ok(Bytes::from_static(b"partial")),
                Err(DriveError::unknown(key, "EPIPE", "upload aborted")),
            ]));
            let err = disk.put(key, chunks.into()).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownException);
        }

        assert!(!disk.exists("new.bin").await.unwrap().exists);
        assert_eq!(disk.get("kept.bin").await.unwrap().content, "old");
        assert_eq!(list(&disk, "").await, vec!["kept.bin"]);
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let (_dir, disk) = disk();
        assert_eq!(disk.get("nope").await.unwrap_err().kind(), ErrorKind::FileNotFound);
        assert_eq!(
            disk.get_stream("nope").await.err().unwrap().kind(),
            ErrorKind::FileNotFound
        );
        assert_eq!(disk.get_stat("nope").await.unwrap_err().kind(), ErrorKind::FileNotFound);
        assert_eq!(disk.delete("nope").await.unwrap().was_deleted, Some(false));
    }

    #[tokio::test]
    async fn test_append_and_prepend() {
        let (_dir, disk) = disk();
        disk.put("greeting", "hello".into()).await.unwrap();
        disk.append("greeting", Bytes::from(" universe")).await.unwrap();
        assert_eq!(disk.get("greeting").await.unwrap().content, "hello universe");

        disk.put("world", "world".into()).await.unwrap();
        disk.prepend("world", Bytes::from("hello ")).await.unwrap();
        assert_eq!(disk.get("world").await.unwrap().content, "hello world");

        disk.prepend("fresh/file", Bytes::from("first")).await.unwrap();
        assert_eq!(disk.get("fresh/file").await.unwrap().content, "first");
    }

    #[tokio::test]
    async fn test_copy_and_move() {
        let (_dir, disk) = disk();
        disk.put("orig", "x".into()).await.unwrap();

        disk.copy("orig", "nested/copied").await.unwrap();
        assert!(disk.exists("orig").await.unwrap().exists);
        assert!(disk.exists("nested/copied").await.unwrap().exists);

        disk.move_file("orig", "renamed").await.unwrap();
        assert!(!disk.exists("orig").await.unwrap().exists);
        assert!(disk.exists("renamed").await.unwrap().exists);

        let err = disk.move_file("orig", "again").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn test_stat() {
        let (_dir, disk) = disk();
        disk.put("f", "12345".into()).await.unwrap();
        let stat = disk.get_stat("f").await.unwrap();
        assert_eq!(stat.size, 5);
        assert!(stat.raw.downcast_ref::<std::fs::Metadata>().is_some());
    }

    #[tokio::test]
    async fn test_flat_list() {
        let (_dir, disk) = disk();
        for key in ["a/1.txt", "a/b/2.txt", "a/bc/3.txt", "z.txt"] {
            disk.put(key, "x".into()).await.unwrap();
        }

        assert_eq!(list(&disk, "").await, vec!["a/1.txt", "a/b/2.txt", "a/bc/3.txt", "z.txt"]);
        assert_eq!(list(&disk, "a/b").await, vec!["a/b/2.txt", "a/bc/3.txt"]);
        assert_eq!(list(&disk, "a/b/").await, vec!["a/b/2.txt"]);
        assert!(list(&disk, "missing/dir/").await.is_empty());
        assert!(list(&disk, "z.txt/").await.is_empty());
        assert_eq!(list(&disk, "a//b/").await, vec!["a/b/2.txt"]);
    }

    #[tokio::test]
    async fn test_flat_list_can_stop_early() {
        let (_dir, disk) = disk();
        for i in 0..5 {
            disk.put(&format!("f{}", i), "x".into()).await.unwrap();
        }
        let mut listing = disk.flat_list("").unwrap();
        let first = listing.next().await.unwrap().unwrap();
        assert_eq!(first.path, "f0");
        drop(listing);
    }

    #[tokio::test]
    async fn test_parent_traversal_rejected() {
        let (_dir, disk) = disk();
        let err = disk.flat_list("../").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
        let err = disk.get("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
    }

    #[tokio::test]
    async fn test_url_methods_unsupported() {
        let (_dir, disk) = disk();
        assert_eq!(disk.get_url("a").unwrap_err().kind(), ErrorKind::MethodNotSupported);
        assert_eq!(
            disk.get_signed_url("a").await.unwrap_err().kind(),
            ErrorKind::MethodNotSupported
        );
    }
}
