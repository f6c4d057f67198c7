use std::time::Duration;

use islandora_export_core::cache::DiskCache;
use tempfile::tempdir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[test]
fn test_key_is_stable_hex_sha256_of_url() {
    let a = DiskCache::key("https://repo.test/node/1?_format=json");
    let b = DiskCache::key("https://repo.test/node/1?_format=json");
    let c = DiskCache::key("https://repo.test/node/2?_format=json");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_put_then_get_returns_body_verbatim() {
    let dir = tempdir().unwrap();
    // Nested path: put must create the directory itself.
    let cache = DiskCache::new(dir.path().join("nested/islandora"), DAY);
    let url = "https://repo.test/node/1?_format=json";

    assert!(cache.get(url).await.is_none());
    cache.put(url, b"{\"nid\":[{\"value\":1}]}").await.unwrap();
    assert_eq!(
        cache.get(url).await.as_deref(),
        Some(&b"{\"nid\":[{\"value\":1}]}"[..])
    );
    assert!(cache.path_for(url).exists());
}

#[tokio::test]
async fn test_entry_at_or_past_max_age_is_a_miss() {
    let dir = tempdir().unwrap();
    let cache = DiskCache::new(dir.path(), Duration::ZERO);
    let url = "https://repo.test/node/1?_format=json";
    cache.put(url, b"old").await.unwrap();
    assert!(cache.get(url).await.is_none());
}

#[tokio::test]
async fn test_put_into_unwritable_location_is_an_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let cache = DiskCache::new(blocker.join("cache"), DAY);
    assert!(cache.put("https://repo.test/x", b"body").await.is_err());
}
