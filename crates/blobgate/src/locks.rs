//! Per-blob locks.
//!
//! Upload writes bytes and then an index record; delete removes a record and
//! then, if no owner is left, the bytes. Both hold the blob's lock for the
//! whole sequence so one never interleaves with the other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use blobgate_core::ContentHash;

type Slots = HashMap<ContentHash, Arc<AsyncMutex<()>>>;

/// One async mutex per content hash, created on demand.
#[derive(Default)]
pub(crate) struct BlobLocks {
    slots: Mutex<Slots>,
}

impl BlobLocks {
    /// Wait for exclusive use of `hash`.
    pub(crate) async fn lock(&self, hash: &ContentHash) -> BlobLockGuard<'_> {
        let slot = self.slots().entry(*hash).or_default().clone();
        let guard = slot.lock_owned().await;
        BlobLockGuard {
            locks: self,
            hash: *hash,
            guard: Some(guard),
        }
    }

    /// Hashes with a holder or a waiter.
    #[cfg(test)]
    pub(crate) fn held(&self) -> usize {
        self.slots().len()
    }

    // The map is only touched in short non-panicking sections.
    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the blob's lock on drop, forgetting the slot once unused.
pub(crate) struct BlobLockGuard<'a> {
    locks: &'a BlobLocks,
    hash: ContentHash,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for BlobLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut slots = self.locks.slots();
        if slots
            .get(&self.hash)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_hash_waits() {
        let locks = Arc::new(BlobLocks::default());
        let hash = ContentHash::digest(b"contended");

        let first = locks.lock(&hash).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&hash).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.held(), 0);
    }

    #[tokio::test]
    async fn test_different_hashes_do_not_block() {
        let locks = BlobLocks::default();
        let _a = locks.lock(&ContentHash::digest(b"a")).await;
        let _b = locks.lock(&ContentHash::digest(b"b")).await;
        assert_eq!(locks.held(), 2);
    }
}
