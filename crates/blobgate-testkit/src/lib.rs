//! # blobgate Testkit
//!
//! Testing utilities for blobgate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: identities that can mint metadata events and credentials,
//!   plus shared in-memory stores
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use blobgate_testkit::generators::{MetadataParams, metadata_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn event_id_is_deterministic(params: MetadataParams) {
//!         let e1 = metadata_from_params(&params);
//!         let e2 = metadata_from_params(&params);
//!         prop_assert_eq!(e1.id, e2.id);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use blobgate_core::{AuthAction, ContentHash};
//! use blobgate_testkit::fixtures::TestFixture;
//!
//! let owner = TestFixture::new();
//! let viewer = TestFixture::new();
//! let hash = ContentHash::digest(b"photo");
//!
//! let metadata = owner.make_metadata(&hash, &[viewer.public_key()], 1_700_000_000);
//! let credential = viewer.make_credential(AuthAction::Get);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party_fixtures, now_secs, TestFixture, TestStores};
pub use generators::{metadata_from_params, MetadataParams};
