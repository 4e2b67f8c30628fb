//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use blobgate_blobs::{BlobDescriptor, BlobIndex, BlobResult, EventStoreBlobIndex};
use blobgate_core::{AuthAction, ContentHash, Event, EventBuilder, Kind, PublicKey, Tag};
use blobgate_store::{EventStore, MemoryEventStore, Result as StoreResult, SaveResult};

/// Service URL used for descriptors built by fixtures.
pub const TEST_SERVICE_URL: &str = "http://localhost:3334";

/// How long fixture credentials stay valid.
pub const CREDENTIAL_TTL_SECS: i64 = 3600;

/// A test identity.
#[derive(Debug, Clone)]
pub struct TestFixture {
    pub identity: PublicKey,
}

impl TestFixture {
    /// Create a new test fixture with a random identity.
    pub fn new() -> Self {
        Self {
            identity: PublicKey::from_bytes(rand::random()),
        }
    }

    /// Create with a deterministic identity.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            identity: PublicKey::from_bytes(seed),
        }
    }

    /// The fixture's identity.
    pub fn public_key(&self) -> PublicKey {
        self.identity
    }

    /// A file metadata event for `hash` naming each of `viewers` in a `"p"` tag.
    pub fn make_metadata(&self, hash: &ContentHash, viewers: &[PublicKey], created_at: i64) -> Event {
        EventBuilder::new(Kind::FILE_METADATA)
            .created_at(created_at)
            .tag(Tag::new("x", hash.to_hex()))
            .tags(viewers.iter().map(|v| Tag::new("p", v.to_hex())))
            .build(self.identity)
    }

    /// A credential for `action`, issued a second ago and valid for an hour.
    pub fn make_credential(&self, action: AuthAction) -> Event {
        let now = now_secs();
        self.make_credential_at(action, now - 1, now + CREDENTIAL_TTL_SECS)
    }

    /// A credential for `action` with explicit issue and expiry times.
    pub fn make_credential_at(&self, action: AuthAction, created_at: i64, expiration: i64) -> Event {
        EventBuilder::new(Kind::BLOB_AUTH)
            .created_at(created_at)
            .tag(Tag::new("t", action.as_str()))
            .tag(Tag::new("expiration", expiration.to_string()))
            .content(format!("{} blob", action))
            .build(self.identity)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0xff;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Shared in-memory event store and the blob index over it.
pub struct TestStores {
    pub events: Arc<MemoryEventStore>,
    pub index: Arc<EventStoreBlobIndex<Arc<MemoryEventStore>>>,
}

impl TestStores {
    /// Empty stores.
    pub fn new() -> Self {
        let events = Arc::new(MemoryEventStore::new());
        let index = Arc::new(EventStoreBlobIndex::new(events.clone()));
        Self { events, index }
    }

    /// Save an event straight into the event store.
    pub async fn publish(&self, event: &Event) -> StoreResult<SaveResult> {
        self.events.save_event(event).await
    }

    /// Record `owner` as holding a blob with these bytes.
    pub async fn own_blob(&self, owner: &PublicKey, data: &[u8]) -> BlobResult<BlobDescriptor> {
        let descriptor = BlobDescriptor::new(
            TEST_SERVICE_URL,
            ContentHash::digest(data),
            data.len() as u64,
            None,
            None,
            now_secs(),
        );
        self.index.keep(&descriptor, owner).await?;
        Ok(descriptor)
    }
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time in Unix seconds.
pub fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::{validate_credential, validate_event};
    use futures::TryStreamExt;

    #[test]
    fn test_fixture_metadata() {
        let author = TestFixture::new();
        let viewer = TestFixture::new();
        let hash = ContentHash::digest(b"photo");

        let event = author.make_metadata(&hash, &[viewer.public_key()], 1_700_000_000);

        assert_eq!(event.kind, Kind::FILE_METADATA);
        assert_eq!(event.first_tag_value("x"), Some(hash.to_hex().as_str()));
        assert!(event.references_pubkey(&viewer.public_key()));
        assert!(validate_event(&event).is_ok());
    }

    #[test]
    fn test_fixture_credential_is_valid_now() {
        let fixture = TestFixture::new();
        let credential = fixture.make_credential(AuthAction::Upload);
        assert!(validate_credential(&credential, AuthAction::Upload, now_secs()).is_ok());
        assert!(validate_credential(&credential, AuthAction::Delete, now_secs()).is_err());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has a unique identity
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }

    #[tokio::test]
    async fn test_stores_own_blob() {
        let stores = TestStores::new();
        let owner = TestFixture::new().public_key();

        let descriptor = stores.own_blob(&owner, b"bytes").await.unwrap();
        let listed: Vec<_> = stores.index.list(&owner).try_collect().await.unwrap();
        assert_eq!(listed, vec![descriptor]);
    }
}
