//! Property tests over the whole gate.

use proptest::prelude::*;

use blobgate::blobs::{BlobStore, LocalBlobStore, MemoryBlobStore};
use blobgate::store::MemoryEventStore;
use blobgate::{AllowList, AuthAction, Denial, Gate};
use blobgate_testkit::generators::{blob_bytes, content_hash};
use blobgate_testkit::TestFixture;

const MAX: u64 = 1024;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn snapshot(dir: &std::path::Path) -> Vec<(std::ffi::OsString, Vec<u8>)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (e.file_name(), std::fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn storing_twice_matches_storing_once(body in blob_bytes(4096)) {
        let once = tempfile::tempdir().unwrap();
        let twice = tempfile::tempdir().unwrap();
        let hash = blobgate::ContentHash::digest(&body);

        runtime().block_on(async {
            LocalBlobStore::new(once.path()).store(&hash, &body).await.unwrap();

            let store = LocalBlobStore::new(twice.path());
            store.store(&hash, &body).await.unwrap();
            store.store(&hash, &body).await.unwrap();
        });

        prop_assert_eq!(snapshot(once.path()), snapshot(twice.path()));
    }

    #[test]
    fn unreferenced_hashes_are_never_served(hash in content_hash()) {
        let viewer = TestFixture::new();
        let gate = Gate::new(
            MemoryEventStore::new(),
            MemoryBlobStore::new(),
            AllowList::default(),
            MAX,
            "http://localhost:3334",
        );

        let auth = viewer.make_credential(AuthAction::Get);
        let err = runtime()
            .block_on(gate.download_bytes(Some(&auth), &hash))
            .unwrap_err();
        prop_assert_eq!(err.denial(), Some(&Denial::NoAssociatedEvent));
    }

    #[test]
    fn upload_limit_is_exact(body in blob_bytes(2 * MAX as usize)) {
        let owner = TestFixture::new();
        let gate = Gate::new(
            MemoryEventStore::new(),
            MemoryBlobStore::new(),
            AllowList::new([owner.public_key()]),
            MAX,
            "http://localhost:3334",
        );

        let auth = owner.make_credential(AuthAction::Upload);
        let result = runtime().block_on(gate.upload(Some(&auth), &body, None, None));
        if body.len() as u64 > MAX {
            let err = result.unwrap_err();
            prop_assert_eq!(err.denial(), Some(&Denial::QuotaExceeded));
        } else {
            let descriptor = result.unwrap();
            prop_assert_eq!(descriptor.size, body.len() as u64);
        }
    }
}
