//! In-process disk backed by `object_store::memory::InMemory`.
//!
//! Contents live as long as the disk instance. Useful for tests and for
//! ephemeral scratch space.

use crate::object_store_ops::{DeleteReporting, ObjectStoreOps};
use async_trait::async_trait;
use bytes::Bytes;
use flydrive_commons::{
    ByteStream, ContentResponse, DeleteResponse, ExistsResponse, FileListStream, PutContent,
    PutOptions, Response, Result, StatResponse, Storage,
};
use object_store::memory::InMemory;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

pub const DRIVER_NAME: &str = "memory";

/// The memory driver takes no settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryStorageConfig {}

#[derive(Debug)]
pub struct MemoryStorage {
    store: Arc<InMemory>,
    ops: ObjectStoreOps,
}

impl MemoryStorage {
    pub fn new(_config: MemoryStorageConfig) -> Self {
        let store = Arc::new(InMemory::new());
        let ops = ObjectStoreOps::new(store.clone(), None, DeleteReporting::HeadFirst);
        Self { store, ops }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(MemoryStorageConfig::default())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn driver_name(&self) -> &str {
        DRIVER_NAME
    }

    fn driver(&self) -> &(dyn Any + Send + Sync) {
        self.store.as_ref()
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
