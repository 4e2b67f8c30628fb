//! Reject-rule chains.
//!
//! Each request kind has its own rule trait. A [`RuleChain`] runs its rules
//! in insertion order and stops at the first denial; an empty chain allows.
//! [`PolicyEngine`] implements every rule trait so it can head a chain, with
//! deployment-specific rules appended after it.

use std::sync::Arc;

use async_trait::async_trait;

use blobgate_blobs::BlobIndex;
use blobgate_core::{ContentHash, Event};
use blobgate_store::EventStore;

use crate::engine::PolicyEngine;
use crate::verdict::Verdict;

/// Vets an event before it is stored.
#[async_trait]
pub trait EventRule: Send + Sync {
    async fn check_event(&self, event: &Event) -> Verdict;
}

/// Vets a blob download.
#[async_trait]
pub trait GetRule: Send + Sync {
    async fn check_get(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict;
}

/// Vets a blob upload before any bytes are stored.
#[async_trait]
pub trait UploadRule: Send + Sync {
    async fn check_upload(
        &self,
        credential: Option<&Event>,
        size: u64,
        extension: Option<&str>,
    ) -> Verdict;
}

/// Vets a blob delete.
#[async_trait]
pub trait DeleteRule: Send + Sync {
    async fn check_delete(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict;
}

/// Ordered rules, first denial wins.
pub struct RuleChain<R: ?Sized> {
    rules: Vec<Box<R>>,
}

impl<R: ?Sized> RuleChain<R> {
    /// An empty chain, which allows everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule; it runs after every rule already present.
    pub fn push(&mut self, rule: Box<R>) {
        self.rules.push(rule);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, rule: Box<R>) -> Self {
        self.push(rule);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R: ?Sized> Default for RuleChain<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> std::fmt::Debug for RuleChain<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[async_trait]
impl EventRule for RuleChain<dyn EventRule> {
    async fn check_event(&self, event: &Event) -> Verdict {
        for rule in &self.rules {
            let verdict = rule.check_event(event).await;
            if !verdict.is_allowed() {
                return verdict;
            }
        }
        Verdict::Allow
    }
}

#[async_trait]
impl GetRule for RuleChain<dyn GetRule> {
    async fn check_get(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        for rule in &self.rules {
            let verdict = rule.check_get(credential, hash).await;
            if !verdict.is_allowed() {
                return verdict;
            }
        }
        Verdict::Allow
    }
}

#[async_trait]
impl UploadRule for RuleChain<dyn UploadRule> {
    async fn check_upload(
        &self,
        credential: Option<&Event>,
        size: u64,
        extension: Option<&str>,
    ) -> Verdict {
        for rule in &self.rules {
            let verdict = rule.check_upload(credential, size, extension).await;
            if !verdict.is_allowed() {
                return verdict;
            }
        }
        Verdict::Allow
    }
}

#[async_trait]
impl DeleteRule for RuleChain<dyn DeleteRule> {
    async fn check_delete(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        for rule in &self.rules {
            let verdict = rule.check_delete(credential, hash).await;
            if !verdict.is_allowed() {
                return verdict;
            }
        }
        Verdict::Allow
    }
}

#[async_trait]
impl<S: EventStore, I: BlobIndex> EventRule for PolicyEngine<S, I> {
    async fn check_event(&self, event: &Event) -> Verdict {
        self.authorize_event_ingestion(event)
    }
}

#[async_trait]
impl<S: EventStore, I: BlobIndex> GetRule for PolicyEngine<S, I> {
    async fn check_get(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        self.authorize_download(credential, hash).await
    }
}

#[async_trait]
impl<S: EventStore, I: BlobIndex> UploadRule for PolicyEngine<S, I> {
    async fn check_upload(
        &self,
        credential: Option<&Event>,
        size: u64,
        extension: Option<&str>,
    ) -> Verdict {
        self.authorize_upload(credential, size, extension)
    }
}

#[async_trait]
impl<S: EventStore, I: BlobIndex> DeleteRule for PolicyEngine<S, I> {
    async fn check_delete(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        self.authorize_delete(credential, hash)
    }
}

#[async_trait]
impl<T: EventRule + ?Sized> EventRule for Arc<T> {
    async fn check_event(&self, event: &Event) -> Verdict {
        (**self).check_event(event).await
    }
}

#[async_trait]
impl<T: GetRule + ?Sized> GetRule for Arc<T> {
    async fn check_get(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        (**self).check_get(credential, hash).await
    }
}

#[async_trait]
impl<T: UploadRule + ?Sized> UploadRule for Arc<T> {
    async fn check_upload(
        &self,
        credential: Option<&Event>,
        size: u64,
        extension: Option<&str>,
    ) -> Verdict {
        (**self).check_upload(credential, size, extension).await
    }
}

#[async_trait]
impl<T: DeleteRule + ?Sized> DeleteRule for Arc<T> {
    async fn check_delete(&self, credential: Option<&Event>, hash: &ContentHash) -> Verdict {
        (**self).check_delete(credential, hash).await
    }
}
