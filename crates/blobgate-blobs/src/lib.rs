//! # blobgate Blobs
//!
//! Content-addressed blob storage and the per-owner blob index.
//!
//! ## Overview
//!
//! - [`BlobStore`] keeps the bytes, keyed by [`ContentHash`](blobgate_core::ContentHash).
//!   [`LocalBlobStore`] writes one file per blob; [`MemoryBlobStore`] is for tests.
//! - [`BlobIndex`] records which identities uploaded which blobs.
//!   [`EventStoreBlobIndex`] keeps those records in an
//!   [`EventStore`](blobgate_store::EventStore).
//!
//! The two halves are independent: a blob may have several owners, and the
//! bytes are only removed by the caller once the last owner is gone.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobgate_blobs::{BlobStore, LocalBlobStore};
//! use blobgate_core::ContentHash;
//!
//! async fn example() {
//!     let blobs = LocalBlobStore::new("blobs");
//!     let body = b"hello";
//!     let hash = ContentHash::digest(body);
//!     blobs.store(&hash, body).await.unwrap();
//! }
//! ```

pub mod descriptor;
pub mod error;
pub mod index;
pub mod local;
pub mod memory;
pub mod traits;

pub use descriptor::BlobDescriptor;
pub use error::{BlobError, BlobResult};
pub use index::{descriptor_from_event, EventStoreBlobIndex};
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{BlobIndex, BlobRead, BlobReader, BlobStore};
