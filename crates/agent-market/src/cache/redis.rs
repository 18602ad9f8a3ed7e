//! Redis-backed key-value store

use super::store::KeyValueStore;
use crate::config::CacheConfig;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, AsyncIter, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Shared store reached over a multiplexed connection
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    url: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").field("url", &self.url).finish()
    }
}

impl RedisStore {
    /// Connect and verify the server answers PING within the configured timeout
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config.url();
        info!(%url, "Connecting to Redis");

        let client = Client::open(url.as_str())?;
        let connection = tokio::time::timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            MarketError::CacheError(format!(
                "timed out after {:?} connecting to {url}",
                config.connect_timeout
            ))
        })??;

        let store = Self { connection, url };
        tokio::time::timeout(config.connect_timeout, store.ping())
            .await
            .map_err(|_| MarketError::CacheError("timed out waiting for PING".to_string()))??;

        info!(url = %store.url, "Redis connection established");
        Ok(store)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(MarketError::CacheError(format!("unexpected PING reply: {reply}")))
        }
    }

    /// Keys matching a glob pattern, walked with a `SCAN` cursor
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        let mut iter: AsyncIter<'_, String> = conn.scan_match(pattern).await?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        // SCAN may report a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Delete every key matching a glob pattern, returning how many were removed
    pub async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let keys = self.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection.clone();
        let mut deleted = 0;
        for batch in keys.chunks(DELETE_BATCH) {
            let removed: i64 = conn.del(batch).await?;
            deleted += removed.max(0) as usize;
        }
        debug!(pattern, deleted, "Deleted keys by pattern");
        Ok(deleted)
    }
}

/// Keys per DEL when purging by pattern
const DELETE_BATCH: usize = 500;

/// Whole seconds for SETEX, rounding sub-second TTLs up
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 { secs + 1 } else { secs }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        if ttl.is_zero() {
            let _: i64 = conn.del(key).await?;
            return Ok(());
        }
        let _: () = conn.set_ex(key, value, ttl_seconds(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
