//! Ownership resolution: does a still-current metadata event prove that a
//! requester may fetch a blob?
//!
//! For a content hash, every file metadata event tagging it with `"x"` is
//! fetched and reduced to the latest event per author. The requester is
//! entitled if any retained event
//!
//! 1. names the requester in a `"p"` tag, and
//! 2. comes from an author whose blob index lists the hash.
//!
//! The second condition stops an allowed author from granting access to
//! bytes someone else uploaded.

use std::collections::HashMap;

use futures::StreamExt;

use blobgate_blobs::{BlobError, BlobIndex};
use blobgate_core::{ContentHash, Event, Filter, Kind, PublicKey};
use blobgate_store::{EventStore, Result as StoreResult};

/// Keep only each author's latest event.
///
/// Latest means greatest `created_at`; on a tie, the greatest event id wins,
/// so the result does not depend on query order. Output is sorted by author.
pub fn latest_per_author(events: Vec<Event>) -> Vec<Event> {
    let mut latest: HashMap<PublicKey, Event> = HashMap::new();

    for event in events {
        match latest.get(&event.pubkey) {
            Some(kept) if (kept.created_at, kept.id) >= (event.created_at, event.id) => {}
            _ => {
                latest.insert(event.pubkey, event);
            }
        }
    }

    let mut retained: Vec<Event> = latest.into_values().collect();
    retained.sort_by(|a, b| a.pubkey.cmp(&b.pubkey));
    retained
}

/// Resolves requester entitlement from metadata events and blob ownership.
#[derive(Debug)]
pub struct OwnershipResolver<S, I> {
    events: S,
    index: I,
}

impl<S: EventStore, I: BlobIndex> OwnershipResolver<S, I> {
    /// Create a resolver over an event store and a blob index.
    pub fn new(events: S, index: I) -> Self {
        Self { events, index }
    }

    /// Decide whether `requester` may access the blob `hash`.
    ///
    /// Fails only if the event store query fails; callers must treat that
    /// as a refusal.
    pub async fn resolve(&self, hash: &ContentHash, requester: &PublicKey) -> StoreResult<bool> {
        let filter = Filter::new()
            .kind(Kind::FILE_METADATA)
            .tag("x", hash.to_hex());
        let events = self.events.query_events(&filter).await?;

        let candidates = latest_per_author(events);
        tracing::debug!(
            %hash,
            %requester,
            authors = candidates.len(),
            "resolving blob ownership"
        );

        for event in &candidates {
            if !event.references_pubkey(requester) {
                continue;
            }
            if self.author_owns(&event.pubkey, hash).await {
                tracing::debug!(%hash, %requester, author = %event.pubkey, event = %event.id, "access granted by metadata event");
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Whether `author`'s blob index lists `hash`.
    ///
    /// Unreadable records are skipped. A failing index counts as not owning
    /// the blob.
    pub async fn author_owns(&self, author: &PublicKey, hash: &ContentHash) -> bool {
        let mut listed = self.index.list(author);
        while let Some(item) = listed.next().await {
            match item {
                Ok(descriptor) if descriptor.sha256 == *hash => return true,
                Ok(_) => {}
                Err(BlobError::InvalidDescriptor(reason)) => {
                    tracing::warn!(%author, %reason, "skipping unreadable blob index record");
                }
                Err(e) => {
                    tracing::warn!(%author, %hash, error = %e, "failed to list blobs, treating as not owned");
                    return false;
                }
            }
        }
        false
    }
}
