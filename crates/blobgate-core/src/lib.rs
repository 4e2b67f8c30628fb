//! # blobgate Core
//!
//! Pure primitives for blobgate: events, tags, filters, identities and
//! content hashes.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over the data that flows through the authorization layer.
//!
//! ## Key Types
//!
//! - [`Event`] - A signed record: either a credential or file metadata
//! - [`EventId`] - Content-addressed identifier (SHA-256 of canonical form)
//! - [`PublicKey`] - Identity of an author or requester
//! - [`ContentHash`] - SHA-256 of blob bytes, the blob storage key
//! - [`Filter`] - Query constraints over events
//!
//! ## Canonicalization
//!
//! Event ids commit to a compact JSON array. See [`canonical`] module.

pub mod canonical;
pub mod error;
pub mod event;
pub mod filter;
pub mod types;
pub mod validation;

pub use canonical::{canonical_serialization, event_id};
pub use error::{CoreError, ValidationError};
pub use event::{Event, EventBuilder, Kind, Tag};
pub use filter::{newest_first, Filter};
pub use types::{ContentHash, EventId, PublicKey, Signature};
pub use validation::{validate_credential, validate_event, AuthAction};
