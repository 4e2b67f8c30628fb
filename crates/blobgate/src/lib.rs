//! # blobgate
//!
//! Authorization and content-addressed blob storage in front of a Nostr
//! relay with a Blossom blob server.
//!
//! ## Overview
//!
//! blobgate decides, for every blob upload, download and delete, whether the
//! requester may do it, and keeps the bytes keyed by their SHA-256:
//!
//! - **Ingestion**: only file metadata events (kind 1063) from allow-listed
//!   authors are stored
//! - **Upload / delete**: allow-listed identities only, uploads capped in size
//! - **Download**: the requester must be named (`"p"` tag) in the latest
//!   metadata event of an author who really uploaded the blob
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobgate::{Gate, GateConfig};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = GateConfig::load()?;
//!     let gate = Gate::open(&config)?;
//!
//!     // let verdict = gate.ingest_event(&event).await?;
//!     // let descriptor = gate.upload(Some(&auth), body, Some("image/png"), Some("png")).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `blobgate::core` - Events, filters, identities, content hashes
//! - `blobgate::store` - Event store abstraction and SQLite
//! - `blobgate::blobs` - Blob storage and the blob index
//! - `blobgate::policy` - Verdicts, allow-list, ownership, rule chains

pub mod config;
pub mod error;
pub mod gate;
pub mod info;
mod locks;

pub use config::{ConfigError, GateConfig};
pub use error::{GateError, Result};
pub use gate::{Gate, GateEngine, GateIndex, IngestResult};
pub use info::RelayInfo;

// Re-export component crates
pub use blobgate_blobs as blobs;
pub use blobgate_core as core;
pub use blobgate_policy as policy;
pub use blobgate_store as store;

// Re-export commonly used types
pub use blobgate_blobs::{BlobDescriptor, BlobError, BlobReader};
pub use blobgate_core::{AuthAction, ContentHash, Event, EventBuilder, EventId, Kind, PublicKey, Tag};
pub use blobgate_policy::{AllowList, Denial, Verdict};
