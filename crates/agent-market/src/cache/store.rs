//! Key-value store abstraction and the in-process implementation

use crate::error::Result;
use async_trait::async_trait;
use cached::Cached;
use cached::stores::{CanExpire, ExpiringValueCache};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Byte-valued store with per-entry expiry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` so that it expires after `ttl`. A zero TTL stores nothing.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove `key`, reporting whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct Expiring {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl CanExpire for Expiring {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process store, bounded in entry count
pub struct MemoryStore {
    entries: Mutex<ExpiringValueCache<String, Expiring>>,
}

impl MemoryStore {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(ExpiringValueCache::with_size(capacity)),
        }
    }

    /// Number of stored entries, including ones that expired but were not yet evicted
    pub async fn len(&self) -> usize {
        self.entries.lock().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.cache_clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        let mut entries = self.entries.lock().await;
        Ok(entries.cache_get(&key).map(|e| e.bytes.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let key = key.to_string();
        let mut entries = self.entries.lock().await;
        if ttl.is_zero() {
            entries.cache_remove(&key);
            return Ok(());
        }
        entries.cache_set(
            key,
            Expiring {
                bytes: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let mut entries = self.entries.lock().await;
        Ok(entries.cache_remove(&key).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set("ACME_profile_v1", b"payload".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.get("ACME_profile_v1").await.unwrap(),
            Some(b"payload".to_vec())
        );
        assert_eq!(store.get("ACME_profile_v2").await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", b"a".to_vec(), Duration::from_secs(60)).await.unwrap();
        store.set("k", b"b".to_vec(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), Duration::from_millis(30)).await.unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_readable() {
        let store = MemoryStore::new();
        store.set("k", b"old".to_vec(), Duration::from_secs(60)).await.unwrap();
        store.set("k", b"new".to_vec(), Duration::ZERO).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), Duration::from_secs(60)).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty().await);
    }
}
