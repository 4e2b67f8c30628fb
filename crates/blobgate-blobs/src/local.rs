//! Local filesystem blob storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use blobgate_core::ContentHash;

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobReader, BlobStore};

/// Distinguishes concurrent writers of the same blob.
static NEXT_PARTIAL: AtomicU64 = AtomicU64::new(0);

/// Local filesystem storage.
///
/// Stores blobs as files named by their hex hash directly under the root:
/// `{root}/{sha256_hex}`. The root is created on first store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create storage rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.to_hex())
    }

    fn partial_path(&self, hash: &ContentHash) -> PathBuf {
        let n = NEXT_PARTIAL.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.partial", hash.to_hex(), std::process::id(), n))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, hash: &ContentHash, body: &[u8]) -> BlobResult<()> {
        fs::create_dir_all(&self.root).await?;

        // Write aside then rename, so readers never see a half-written blob.
        let partial = self.partial_path(hash);
        if let Err(e) = fs::write(&partial, body).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&partial, self.blob_path(hash)).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(%hash, size = body.len(), "stored blob");
        Ok(())
    }

    async fn load(&self, hash: &ContentHash) -> BlobResult<BlobReader> {
        match fs::File::open(self.blob_path(hash)).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(*hash)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, hash: &ContentHash) -> BlobResult<()> {
        match fs::remove_file(self.blob_path(hash)).await {
            Ok(()) => {
                tracing::debug!(%hash, "deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(*hash)),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, hash: &ContentHash) -> BlobResult<bool> {
        match fs::metadata(self.blob_path(hash)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
