//! Blob index backed by an event store.
//!
//! Each (owner, blob) pair is one event of kind [`Kind::BLOB_AUTH`] authored
//! by the owner:
//!
//! ```text
//! kind:       24242
//! pubkey:     <owner>
//! created_at: <uploaded>
//! tags:       ["x", <sha256>] ["size", <bytes>] ["url", <url>] ["type", <mime>]?
//! ```
//!
//! Keeping the inventory in the event store means ownership lives next to
//! the metadata events that reference it, and survives restarts whenever the
//! event store does.

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};

use blobgate_core::{ContentHash, Event, EventBuilder, Filter, Kind, PublicKey, Tag};
use blobgate_store::EventStore;

use crate::descriptor::BlobDescriptor;
use crate::error::{BlobError, BlobResult};
use crate::traits::BlobIndex;

/// [`BlobIndex`] that stores its records as events.
#[derive(Debug)]
pub struct EventStoreBlobIndex<S> {
    store: S,
}

impl<S: EventStore> EventStoreBlobIndex<S> {
    /// Wrap an event store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn records(hash: &ContentHash) -> Filter {
        Filter::new().kind(Kind::BLOB_AUTH).tag("x", hash.to_hex())
    }

    fn owned_records(hash: &ContentHash, owner: &PublicKey) -> Filter {
        Self::records(hash).author(*owner)
    }
}

/// Build the index record for `blob` held by `owner`.
pub fn record_for(blob: &BlobDescriptor, owner: &PublicKey) -> Event {
    let mut builder = EventBuilder::new(Kind::BLOB_AUTH)
        .created_at(blob.uploaded)
        .tag(Tag::new("x", blob.sha256.to_hex()))
        .tag(Tag::new("size", blob.size.to_string()))
        .tag(Tag::new("url", blob.url.clone()));
    if let Some(mime) = &blob.mime_type {
        builder = builder.tag(Tag::new("type", mime.clone()));
    }
    builder.build(*owner)
}

/// Read a descriptor back out of an index record.
pub fn descriptor_from_event(event: &Event) -> BlobResult<BlobDescriptor> {
    let hash = event
        .first_tag_value("x")
        .ok_or_else(|| BlobError::InvalidDescriptor(format!("event {} has no x tag", event.id)))?;
    let sha256 = ContentHash::parse(hash)
        .map_err(|e| BlobError::InvalidDescriptor(format!("event {}: {}", event.id, e)))?;

    let size = event
        .first_tag_value("size")
        .ok_or_else(|| {
            BlobError::InvalidDescriptor(format!("event {} has no size tag", event.id))
        })?
        .parse::<u64>()
        .map_err(|e| BlobError::InvalidDescriptor(format!("event {}: size: {}", event.id, e)))?;

    Ok(BlobDescriptor {
        url: event.first_tag_value("url").unwrap_or_default().to_string(),
        sha256,
        size,
        mime_type: event.first_tag_value("type").map(str::to_string),
        uploaded: event.created_at,
    })
}

#[async_trait]
impl<S: EventStore> BlobIndex for EventStoreBlobIndex<S> {
    async fn keep(&self, blob: &BlobDescriptor, owner: &PublicKey) -> BlobResult<()> {
        let existing = self
            .store
            .count_events(&Self::owned_records(&blob.sha256, owner))
            .await?;
        if existing > 0 {
            tracing::debug!(hash = %blob.sha256, owner = %owner, "blob already indexed");
            return Ok(());
        }

        self.store.save_event(&record_for(blob, owner)).await?;
        tracing::debug!(hash = %blob.sha256, owner = %owner, "indexed blob");
        Ok(())
    }

    fn list<'a>(&'a self, owner: &PublicKey) -> BoxStream<'a, BlobResult<BlobDescriptor>> {
        let filter = Filter::new().kind(Kind::BLOB_AUTH).author(*owner);

        stream::once(async move { self.store.query_events(&filter).await })
            .flat_map(|queried| match queried {
                Ok(events) => stream::iter(events)
                    .map(|event| descriptor_from_event(&event))
                    .left_stream(),
                Err(e) => stream::once(future::ready(Err(BlobError::from(e)))).right_stream(),
            })
            .boxed()
    }

    async fn get(&self, hash: &ContentHash) -> BlobResult<Option<BlobDescriptor>> {
        let events = self.store.query_events(&Self::records(hash).limit(1)).await?;
        events.first().map(descriptor_from_event).transpose()
    }

    async fn delete(&self, hash: &ContentHash, owner: &PublicKey) -> BlobResult<bool> {
        let events = self
            .store
            .query_events(&Self::owned_records(hash, owner))
            .await?;

        let mut removed = false;
        for event in &events {
            removed |= self.store.delete_event(&event.id).await?;
        }
        Ok(removed)
    }

    async fn owners(&self, hash: &ContentHash) -> BlobResult<Vec<PublicKey>> {
        let events = self.store.query_events(&Self::records(hash)).await?;
        let mut owners: Vec<PublicKey> = events.iter().map(|e| e.pubkey).collect();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }
}
