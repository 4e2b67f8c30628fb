//! Error types for blob storage.

use blobgate_core::ContentHash;
use blobgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during blob storage or index operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// No blob is stored under this hash.
    #[error("blob not found: {0}")]
    NotFound(ContentHash),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event store backing the blob index failed.
    #[error("index error: {0}")]
    Index(#[from] StoreError),

    /// An index record could not be turned into a descriptor.
    #[error("invalid blob descriptor: {0}")]
    InvalidDescriptor(String),

    /// A lock guarding in-memory blobs was poisoned.
    #[error("blob store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for blob operations.
pub type BlobResult<T> = std::result::Result<T, BlobError>;
