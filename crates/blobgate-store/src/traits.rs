//! EventStore trait: the abstract interface for event persistence.
//!
//! The policy layer only ever talks to this trait. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use blobgate_core::{Event, EventId, Filter};

use crate::error::Result;

/// Result of saving an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Event was saved.
    Saved,
    /// Event already exists (idempotent - not an error).
    AlreadyExists,
}

/// The EventStore trait: async interface for event persistence.
///
/// # Design Notes
///
/// - **Idempotent saves**: Saving the same event twice returns `AlreadyExists`.
/// - **Query semantics**: [`Filter::matches`] is the reference; results are
///   ordered newest first (ties broken by id) and truncated to `filter.limit`.
/// - **Concurrency**: implementations synchronise internally; callers may
///   share one store across concurrent requests.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist an event.
    async fn save_event(&self, event: &Event) -> Result<SaveResult>;

    /// Return every stored event matching `filter`, newest first.
    async fn query_events(&self, filter: &Filter) -> Result<Vec<Event>>;

    /// Remove an event by id. Returns whether anything was removed.
    async fn delete_event(&self, id: &EventId) -> Result<bool>;

    /// Count events matching `filter`, ignoring its limit.
    async fn count_events(&self, filter: &Filter) -> Result<usize>;
}

#[async_trait]
impl<S: EventStore + ?Sized> EventStore for std::sync::Arc<S> {
    async fn save_event(&self, event: &Event) -> Result<SaveResult> {
        (**self).save_event(event).await
    }

    async fn query_events(&self, filter: &Filter) -> Result<Vec<Event>> {
        (**self).query_events(filter).await
    }

    async fn delete_event(&self, id: &EventId) -> Result<bool> {
        (**self).delete_event(id).await
    }

    async fn count_events(&self, filter: &Filter) -> Result<usize> {
        (**self).count_events(filter).await
    }
}
