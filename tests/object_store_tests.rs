use bytes::Bytes;
use course_share::object_store::{LocalStore, ObjectStore, ObjectStoreError};
use course_share::uploads;

fn upload_root() -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("uploads")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_put_writes_under_upload_root() {
    let (dir, store) = upload_root();

    let data = Bytes::from("lecture slides");
    store.put("1700000000000-a1b2c3d4-slides.pdf", data.clone()).await.unwrap();

    let on_disk = std::fs::read(dir.path().join("uploads/1700000000000-a1b2c3d4-slides.pdf")).unwrap();
    assert_eq!(on_disk, data.as_ref());
    assert_eq!(store.get("1700000000000-a1b2c3d4-slides.pdf").await.unwrap(), data);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let (_dir, store) = upload_root();

    let result = store.get("never-uploaded.pdf").await;
    assert!(matches!(result.unwrap_err(), ObjectStoreError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_bytes() {
    let (_dir, store) = upload_root();

    store.put("notes.txt", Bytes::from("x")).await.unwrap();
    assert!(store.exists("notes.txt").await.unwrap());

    store.delete("notes.txt").await.unwrap();
    assert!(!store.exists("notes.txt").await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_is_a_no_op() {
    let (_dir, store) = upload_root();
    store.delete("already-gone.pdf").await.unwrap();
}

#[tokio::test]
async fn test_rejects_escaping_keys() {
    let (dir, store) = upload_root();

    for key in ["../secret", "a/b", "..", "", "a\\b"] {
        let result = store.put(key, Bytes::from("data")).await;
        assert!(matches!(result.unwrap_err(), ObjectStoreError::InvalidKey(_)));
    }
    assert!(!dir.path().join("secret").exists());
}

#[tokio::test]
async fn test_recreates_missing_root_on_write() {
    let (dir, store) = upload_root();
    let root = dir.path().join("uploads");

    std::fs::remove_dir_all(&root).unwrap();
    store.put("late.pdf", Bytes::from("data")).await.unwrap();

    assert!(root.join("late.pdf").exists());
}

#[tokio::test]
async fn test_store_upload_returns_relative_url() {
    let (dir, store) = upload_root();

    let url = uploads::store_upload(&store, Some("Week 1.pdf"), Bytes::from("pdf"))
        .await
        .unwrap();
    assert!(url.starts_with("uploads/"));
    assert!(url.ends_with("-Week_1.pdf"));
    assert!(dir.path().join(&url).exists());

    uploads::remove_stored_bytes(&store, &url).await;
    assert!(!dir.path().join(&url).exists());

    // Second removal and external urls are silently ignored
    uploads::remove_stored_bytes(&store, &url).await;
    uploads::remove_stored_bytes(&store, "https://example.com/a.pdf").await;
}

#[tokio::test]
async fn test_same_name_uploads_do_not_collide() {
    let (_dir, store) = upload_root();

    let first = uploads::store_upload(&store, Some("hw.pdf"), Bytes::from("first"))
        .await
        .unwrap();
    let second = uploads::store_upload(&store, Some("hw.pdf"), Bytes::from("second"))
        .await
        .unwrap();
    assert_ne!(first, second);

    let first_key = first.strip_prefix("uploads/").unwrap();
    assert_eq!(store.get(first_key).await.unwrap(), Bytes::from("first"));
}
