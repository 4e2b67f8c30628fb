//! Integration tests for LocalBlobStore and the SQLite-backed blob index

use blobgate_blobs::{
    BlobDescriptor, BlobError, BlobIndex, BlobStore, EventStoreBlobIndex, LocalBlobStore,
};
use blobgate_core::{ContentHash, PublicKey};
use blobgate_store::SqliteEventStore;
use futures::TryStreamExt;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

async fn read_all(store: &LocalBlobStore, hash: &ContentHash) -> Vec<u8> {
    let mut reader = store.load(hash).await.unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_local_persistence() {
    let temp = TempDir::new().unwrap();

    let data = b"Persistent data";
    let hash = ContentHash::digest(data);

    // Write with one instance
    {
        let storage = LocalBlobStore::new(temp.path());
        storage.store(&hash, data).await.unwrap();
    }

    // Read with new instance
    {
        let storage = LocalBlobStore::new(temp.path());
        assert_eq!(read_all(&storage, &hash).await, data);
    }
}

#[tokio::test]
async fn test_local_concurrent_stores_of_same_blob() {
    let temp = TempDir::new().unwrap();
    let storage = LocalBlobStore::new(temp.path());

    let data = vec![7u8; 64 * 1024];
    let hash = ContentHash::digest(&data);

    let writes = (0..8).map(|_| storage.store(&hash, &data));
    for result in futures::future::join_all(writes).await {
        result.unwrap();
    }

    assert_eq!(read_all(&storage, &hash).await, data);
    let names: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from(hash.to_hex())]);
}

#[tokio::test]
async fn test_local_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = LocalBlobStore::new(temp.path());

    let hash = ContentHash::digest(b"missing");
    assert!(matches!(storage.load(&hash).await, Err(BlobError::NotFound(_))));
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("events.db");
    let owner = PublicKey::from_bytes([0x42; 32]);

    let data = b"indexed";
    let blob = BlobDescriptor::new(
        "http://localhost:3334",
        ContentHash::digest(data),
        data.len() as u64,
        None,
        None,
        1_700_000_000,
    );

    {
        let index = EventStoreBlobIndex::new(SqliteEventStore::open(&db).unwrap());
        index.keep(&blob, &owner).await.unwrap();
    }

    let index = EventStoreBlobIndex::new(SqliteEventStore::open(&db).unwrap());
    let listed: Vec<_> = index.list(&owner).try_collect().await.unwrap();
    assert_eq!(listed, vec![blob.clone()]);
    assert_eq!(index.owners(&blob.sha256).await.unwrap(), vec![owner]);
}
