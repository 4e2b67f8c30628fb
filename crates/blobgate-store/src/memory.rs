//! In-memory implementation of the EventStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use blobgate_core::{newest_first, Event, EventId, Filter};

use crate::error::{Result, StoreError};
use crate::traits::{EventStore, SaveResult};

/// In-memory event store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl MemoryEventStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<EventId, Event>>> {
        self.events
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<EventId, Event>>> {
        self.events
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn matching(&self, filter: &Filter) -> Result<Vec<Event>> {
        let events = self.read()?;
        let mut found: Vec<Event> = events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        found.sort_by(newest_first);
        Ok(found)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn save_event(&self, event: &Event) -> Result<SaveResult> {
        let mut events = self.write()?;
        if events.contains_key(&event.id) {
            return Ok(SaveResult::AlreadyExists);
        }
        events.insert(event.id, event.clone());
        Ok(SaveResult::Saved)
    }

    async fn query_events(&self, filter: &Filter) -> Result<Vec<Event>> {
        let mut found = self.matching(filter)?;
        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn delete_event(&self, id: &EventId) -> Result<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn count_events(&self, filter: &Filter) -> Result<usize> {
        Ok(self.matching(filter)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::{EventBuilder, Kind, PublicKey, Tag};

    fn metadata(author: u8, hash: &str, created_at: i64) -> Event {
        EventBuilder::new(Kind::FILE_METADATA)
            .created_at(created_at)
            .tag(Tag::new("x", hash))
            .build(PublicKey::from_bytes([author; 32]))
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryEventStore::new();
        let event = metadata(1, "h1", 10);

        let result = store.save_event(&event).await.unwrap();
        assert_eq!(result, SaveResult::Saved);

        let found = store
            .query_events(&Filter::new().id(event.id))
            .await
            .unwrap();
        assert_eq!(found, vec![event]);
    }

    #[tokio::test]
    async fn test_memory_store_idempotent() {
        let store = MemoryEventStore::new();
        let event = metadata(1, "h1", 10);

        let r1 = store.save_event(&event).await.unwrap();
        assert_eq!(r1, SaveResult::Saved);

        let r2 = store.save_event(&event).await.unwrap();
        assert_eq!(r2, SaveResult::AlreadyExists);
        assert_eq!(store.count_events(&Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_by_tag_newest_first_with_limit() {
        let store = MemoryEventStore::new();
        for (author, hash, ts) in [(1, "h1", 10), (2, "h1", 30), (3, "h2", 20), (4, "h1", 20)] {
            store.save_event(&metadata(author, hash, ts)).await.unwrap();
        }

        let filter = Filter::new().kind(Kind::FILE_METADATA).tag("x", "h1");
        let found = store.query_events(&filter).await.unwrap();
        let times: Vec<i64> = found.iter().map(|e| e.created_at).collect();
        assert_eq!(times, vec![30, 20, 10]);

        let limited = store.query_events(&filter.clone().limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].created_at, 30);
        assert_eq!(store.count_events(&filter.limit(1)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_event() {
        let store = MemoryEventStore::new();
        let event = metadata(1, "h1", 10);
        store.save_event(&event).await.unwrap();

        assert!(store.delete_event(&event.id).await.unwrap());
        assert!(!store.delete_event(&event.id).await.unwrap());
        assert!(store.query_events(&Filter::new()).await.unwrap().is_empty());
    }
}
