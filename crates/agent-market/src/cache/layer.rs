//! Versioned read-through cache over a key-value store

use super::key::{KeyDescriptor, key_for};
use super::redis::RedisStore;
use super::store::{KeyValueStore, MemoryStore};
use super::table::{Table, decode_scalar, encode_scalar};
use super::ttl::{TtlPolicy, VolatilityClass};
use crate::config::CacheConfig;
use crate::error::Result;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Backing store of a [`CacheLayer`]
#[derive(Clone)]
pub enum CacheBackend {
    Available(Arc<dyn KeyValueStore>),
    /// Every lookup misses and every write is dropped
    Unavailable,
}

/// Hit, miss and write counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// Cache of scalars and tables under versioned keys
///
/// Store failures never reach the caller: a failed read is a miss and a
/// failed write is dropped, both logged.
#[derive(Clone)]
pub struct CacheLayer {
    backend: CacheBackend,
    version: String,
    ttl: TtlPolicy,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            CacheBackend::Available(store) => store.backend(),
            CacheBackend::Unavailable => "unavailable",
        };
        f.debug_struct("CacheLayer")
            .field("backend", &backend)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl CacheLayer {
    pub fn new(backend: CacheBackend, version: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self {
            backend,
            version: version.into(),
            ttl,
            counters: Arc::default(),
        }
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>, version: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self::new(CacheBackend::Available(store), version, ttl)
    }

    /// Layer over a fresh in-process store
    pub fn in_memory(version: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), version, ttl)
    }

    /// Degraded layer that never stores anything
    pub fn unavailable(version: impl Into<String>) -> Self {
        Self::new(CacheBackend::Unavailable, version, TtlPolicy::default())
    }

    /// Connect to the configured store, degrading to a no-op layer on failure
    pub async fn connect(config: &CacheConfig, ttl: TtlPolicy) -> Self {
        if !config.enabled {
            debug!("Cache disabled by configuration");
            return Self::unavailable(&config.version);
        }

        match RedisStore::connect(config).await {
            Ok(store) => Self::with_store(Arc::new(store), &config.version, ttl),
            Err(e) => {
                warn!(error = %e, url = %config.url(), "Cache unavailable, continuing without it");
                Self::unavailable(&config.version)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, CacheBackend::Available(_))
    }

    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    /// Versioned key for an entity and call descriptor
    pub fn key_for(&self, entity: &str, descriptor: &impl KeyDescriptor) -> String {
        key_for(entity, descriptor, &self.version)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }

    async fn read(&self, key: &str) -> Option<Vec<u8>> {
        let CacheBackend::Available(store) = &self.backend else {
            return None;
        };
        match store.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, key, "Cache read failed");
                None
            }
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>, ttl: Duration) {
        let CacheBackend::Available(store) = &self.backend else {
            return;
        };
        match store.set(key, bytes, ttl).await {
            Ok(()) => {
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => warn!(error = %e, key, "Cache write failed"),
        }
    }

    fn record(&self, key: &str, hit: bool) {
        if hit {
            debug!(key, "Cache hit");
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            debug!(key, "Cache miss");
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Cached number, `None` on miss or undecodable entry
    pub async fn get_scalar(&self, key: &str) -> Option<f64> {
        let bytes = self.read(key).await?;
        match decode_scalar(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, key, "Discarding undecodable cached scalar");
                None
            }
        }
    }

    pub async fn set_scalar(&self, key: &str, value: f64, ttl: Duration) {
        self.write(key, encode_scalar(value), ttl).await;
    }

    /// Cached table, `None` on miss or undecodable entry
    pub async fn get_table(&self, key: &str) -> Option<Table> {
        let bytes = self.read(key).await?;
        match Table::from_bytes(&bytes) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(error = %e, key, "Discarding undecodable cached table");
                None
            }
        }
    }

    pub async fn set_table(&self, key: &str, table: &Table, ttl: Duration) {
        match table.to_bytes() {
            Ok(bytes) => self.write(key, bytes, ttl).await,
            Err(e) => warn!(error = %e, key, "Table not cached"),
        }
    }

    /// Return the cached table or fetch, store and return it
    ///
    /// A failing fetch is returned as is and nothing is written.
    pub async fn table_or_fetch<F, Fut>(
        &self,
        key: &str,
        class: VolatilityClass,
        fetch: F,
    ) -> Result<Table>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Table>>,
    {
        if let Some(table) = self.get_table(key).await {
            self.record(key, true);
            return Ok(table);
        }
        self.record(key, false);

        let table = fetch().await?;
        self.set_table(key, &table, self.ttl.ttl(class)).await;
        Ok(table)
    }

    /// Return the cached number or fetch, store and return it
    pub async fn scalar_or_fetch<F, Fut>(
        &self,
        key: &str,
        class: VolatilityClass,
        fetch: F,
    ) -> Result<f64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<f64>>,
    {
        if let Some(value) = self.get_scalar(key).await {
            self.record(key, true);
            return Ok(value);
        }
        self.record(key, false);

        let value = fetch().await?;
        self.set_scalar(key, value, self.ttl.ttl(class)).await;
        Ok(value)
    }
}
