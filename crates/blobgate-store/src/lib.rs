//! # blobgate Store
//!
//! Event store abstraction for blobgate. Provides a trait-based interface
//! for event persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The policy layer never touches a database directly: it asks an
//! [`EventStore`] for events matching a [`Filter`](blobgate_core::Filter).
//! The primary implementation is [`SqliteEventStore`], with
//! [`MemoryEventStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobgate_store::{EventStore, SqliteEventStore};
//! use blobgate_core::{Filter, Kind};
//!
//! async fn example() {
//!     let store = SqliteEventStore::open("events.db").unwrap();
//!
//!     let filter = Filter::new().kind(Kind::FILE_METADATA).tag("x", "<sha256>");
//!     let events = store.query_events(&filter).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent saves**: Saving the same event twice returns `AlreadyExists`
//! - **Tag index**: every tag with a key and a value is indexed for queries
//! - **Ordering**: query results are newest first, ties broken by event id

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;
pub use traits::{EventStore, SaveResult};
