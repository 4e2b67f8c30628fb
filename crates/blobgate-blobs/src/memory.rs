//! In-memory blob storage for tests and ephemeral setups.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use blobgate_core::ContentHash;

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobReader, BlobStore};

/// In-memory blob storage. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<ContentHash, Bytes>>,
}

impl MemoryBlobStore {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> BlobResult<usize> {
        self.blobs
            .read()
            .map(|b| b.len())
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> BlobResult<bool> {
        self.len().map(|n| n == 0)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, hash: &ContentHash, body: &[u8]) -> BlobResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        blobs.insert(*hash, Bytes::copy_from_slice(body));
        Ok(())
    }

    async fn load(&self, hash: &ContentHash) -> BlobResult<BlobReader> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        let bytes = blobs.get(hash).cloned().ok_or(BlobError::NotFound(*hash))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    async fn delete(&self, hash: &ContentHash) -> BlobResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        blobs.remove(hash).map(|_| ()).ok_or(BlobError::NotFound(*hash))
    }

    async fn exists(&self, hash: &ContentHash) -> BlobResult<bool> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        Ok(blobs.contains_key(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_store_and_load() {
        let store = MemoryBlobStore::new();
        let hash = ContentHash::digest(b"memory");

        store.store(&hash, b"memory").await.unwrap();
        assert!(store.exists(&hash).await.unwrap());
        assert_eq!(store.len().unwrap(), 1);

        let mut reader = store.load(&hash).await.unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"memory");
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemoryBlobStore::new();
        let hash = ContentHash::digest(b"nothing");
        assert!(matches!(store.delete(&hash).await, Err(BlobError::NotFound(_))));
        assert!(matches!(store.load(&hash).await, Err(BlobError::NotFound(_))));
        assert!(store.is_empty().unwrap());
    }
}
