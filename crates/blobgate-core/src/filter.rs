//! Event filters: the query contract every event store must honour.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::event::{Event, Kind};
use crate::types::{EventId, PublicKey};

/// A conjunction of constraints over events.
///
/// Each populated field must match; within a field any listed value
/// matches. An empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Accepted event ids.
    pub ids: Option<Vec<EventId>>,
    /// Accepted authors.
    pub authors: Option<Vec<PublicKey>>,
    /// Accepted kinds.
    pub kinds: Option<Vec<Kind>>,
    /// Tag constraints: tag key -> accepted values.
    pub tags: BTreeMap<String, Vec<String>>,
    /// Earliest accepted `created_at` (inclusive).
    pub since: Option<i64>,
    /// Latest accepted `created_at` (inclusive).
    pub until: Option<i64>,
    /// Maximum number of events to return (newest first).
    pub limit: Option<usize>,
}

impl Filter {
    /// Create an empty filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an event id.
    pub fn id(mut self, id: EventId) -> Self {
        self.ids.get_or_insert_with(Vec::new).push(id);
        self
    }

    /// Accept an author.
    pub fn author(mut self, author: PublicKey) -> Self {
        self.authors.get_or_insert_with(Vec::new).push(author);
        self
    }

    /// Accept a kind.
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind);
        self
    }

    /// Require a tag with `key` whose value is `value` (or any other value
    /// already accepted for that key).
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set the inclusive lower time bound.
    pub fn since(mut self, ts: i64) -> Self {
        self.since = Some(ts);
        self
    }

    /// Set the inclusive upper time bound.
    pub fn until(mut self, ts: i64) -> Self {
        self.until = Some(ts);
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Check whether an event satisfies every constraint.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref ids) = self.ids {
            if !ids.contains(&event.id) {
                return false;
            }
        }
        if let Some(ref authors) = self.authors {
            if !authors.contains(&event.pubkey) {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if event.created_at > until {
                return false;
            }
        }
        self.tags.iter().all(|(key, values)| {
            event
                .tag_values(key)
                .any(|v| values.iter().any(|accepted| accepted == v))
        })
    }
}

/// Result ordering shared by all stores: newest first, ties by id.
pub fn newest_first(a: &Event, b: &Event) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
