use replay_core::ContentSource;
use replay_core_store::{BlobStore, DirBlobStore, StoreError, content_hash};

#[test]
fn test_dir_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirBlobStore::open(dir.path().join("blobs")).unwrap();

    let text = "line one\r\nline two\n";
    let hash = store.put(text).unwrap();
    assert_eq!(hash, content_hash(text.as_bytes()));
    assert!(store.contains(&hash));
    assert!(store.root().join(&hash).is_file());
    assert_eq!(store.get(&hash).unwrap(), text);

    // Idempotent.
    assert_eq!(store.put(text).unwrap(), hash);
    assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);
}

#[test]
fn test_dir_store_reopen_sees_existing_blobs() {
    let dir = tempfile::tempdir().unwrap();
    let hash = DirBlobStore::open(dir.path()).unwrap().put("persisted").unwrap();
    let store = DirBlobStore::open(dir.path()).unwrap();
    assert_eq!(store.read_blob(&hash).unwrap(), "persisted");
}

#[test]
fn test_dir_store_missing_and_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirBlobStore::open(dir.path()).unwrap();

    let absent = content_hash(b"never stored");
    assert!(matches!(store.get(&absent), Err(StoreError::MissingBlob(h)) if h == absent));
    assert!(!store.contains(&absent));

    assert!(matches!(store.get("../secret"), Err(StoreError::InvalidHash(_))));
    assert!(store.read_blob("../secret").is_err());
}

#[test]
fn test_dir_store_detects_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirBlobStore::open(dir.path()).unwrap();
    let hash = store.put("original").unwrap();
    std::fs::write(dir.path().join(&hash), "tampered").unwrap();

    assert!(matches!(store.get(&hash), Err(StoreError::CorruptBlob(_))));
    let reason = store.read_blob(&hash).unwrap_err();
    assert!(reason.contains(&hash), "{reason}");
}
