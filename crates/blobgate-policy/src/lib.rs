//! # blobgate Policy
//!
//! Authorization decisions for blob requests and event ingestion.
//!
//! ## Overview
//!
//! Every request ends in a [`Verdict`]: allow, or deny with a [`Denial`]
//! that carries the reason and protocol status. Nothing here mutates state;
//! the engine only reads the event store and the blob index.
//!
//! ## Key Concepts
//!
//! - **AllowList**: identities that may publish metadata, upload and delete
//! - **OwnershipResolver**: proves a requester is named in the latest
//!   metadata event of an author who really holds the blob
//! - **PolicyEngine**: the four decisions (download, upload, delete, ingest)
//! - **RuleChain**: ordered reject rules, first denial wins
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use blobgate_blobs::EventStoreBlobIndex;
//! use blobgate_policy::{AllowList, OwnershipResolver, PolicyEngine, DEFAULT_MAX_FILE_SIZE};
//! use blobgate_store::MemoryEventStore;
//!
//! let events = Arc::new(MemoryEventStore::new());
//! let index = Arc::new(EventStoreBlobIndex::new(events.clone()));
//!
//! let engine = PolicyEngine::new(
//!     AllowList::from_csv("").unwrap(),
//!     DEFAULT_MAX_FILE_SIZE,
//!     OwnershipResolver::new(events, index),
//! );
//! assert!(!engine.authorize_upload(None, 1, None).is_allowed());
//! ```

pub mod allowlist;
pub mod chain;
pub mod engine;
pub mod error;
pub mod ownership;
pub mod verdict;

pub use allowlist::AllowList;
pub use chain::{DeleteRule, EventRule, GetRule, RuleChain, UploadRule};
pub use engine::{PolicyEngine, DEFAULT_MAX_FILE_SIZE};
pub use error::{PolicyError, Result};
pub use ownership::{latest_per_author, OwnershipResolver};
pub use verdict::{Denial, Verdict};
