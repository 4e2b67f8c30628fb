//! Blob storage and blob index trait definitions.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::io::{AsyncRead, AsyncSeek};

use blobgate_core::{ContentHash, PublicKey};

use crate::descriptor::BlobDescriptor;
use crate::error::BlobResult;

/// A seekable async byte stream over a stored blob.
pub trait BlobRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> BlobRead for T {}

/// Boxed reader returned by [`BlobStore::load`].
pub type BlobReader = Box<dyn BlobRead>;

/// Content-addressed blob storage.
///
/// All operations are keyed by [`ContentHash`]. This layer does not check
/// that the bytes hash to the key; callers compute the hash before storing.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob by its hash.
    ///
    /// Storing the same hash twice with the same bytes leaves the store
    /// unchanged. A blob is either stored whole or not at all.
    async fn store(&self, hash: &ContentHash, body: &[u8]) -> BlobResult<()>;

    /// Open a stored blob for reading.
    ///
    /// Returns `BlobError::NotFound` if the blob doesn't exist.
    async fn load(&self, hash: &ContentHash) -> BlobResult<BlobReader>;

    /// Remove a stored blob.
    ///
    /// Returns `BlobError::NotFound` if the blob doesn't exist.
    async fn delete(&self, hash: &ContentHash) -> BlobResult<()>;

    /// Check if a blob exists.
    async fn exists(&self, hash: &ContentHash) -> BlobResult<bool>;
}

/// Per-owner inventory of uploaded blobs.
///
/// One blob may be owned by several identities (each uploaded it); the
/// bytes are shared, the ownership records are not.
#[async_trait]
pub trait BlobIndex: Send + Sync {
    /// Record that `owner` holds `blob`. Idempotent per (owner, hash).
    async fn keep(&self, blob: &BlobDescriptor, owner: &PublicKey) -> BlobResult<()>;

    /// Lazily list the blobs held by `owner`.
    ///
    /// The stream may be dropped before it is exhausted.
    fn list<'a>(&'a self, owner: &PublicKey) -> BoxStream<'a, BlobResult<BlobDescriptor>>;

    /// Look up any descriptor for a hash.
    async fn get(&self, hash: &ContentHash) -> BlobResult<Option<BlobDescriptor>>;

    /// Drop `owner`'s record for `hash`. Returns whether a record existed.
    async fn delete(&self, hash: &ContentHash, owner: &PublicKey) -> BlobResult<bool>;

    /// Every identity holding a record for `hash`.
    async fn owners(&self, hash: &ContentHash) -> BlobResult<Vec<PublicKey>>;
}

#[async_trait]
impl<I: BlobIndex + ?Sized> BlobIndex for Arc<I> {
    async fn keep(&self, blob: &BlobDescriptor, owner: &PublicKey) -> BlobResult<()> {
        (**self).keep(blob, owner).await
    }

    fn list<'a>(&'a self, owner: &PublicKey) -> BoxStream<'a, BlobResult<BlobDescriptor>> {
        (**self).list(owner)
    }

    async fn get(&self, hash: &ContentHash) -> BlobResult<Option<BlobDescriptor>> {
        (**self).get(hash).await
    }

    async fn delete(&self, hash: &ContentHash, owner: &PublicKey) -> BlobResult<bool> {
        (**self).delete(hash, owner).await
    }

    async fn owners(&self, hash: &ContentHash) -> BlobResult<Vec<PublicKey>> {
        (**self).owners(hash).await
    }
}
