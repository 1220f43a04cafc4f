//! Redis-backed durable key-value store.
//!
//! Runs over a tokio connection manager so a dropped connection is retried
//! transparently. Callers treat every error as "store unavailable"; the
//! rate limiter degrades to its in-memory mirror rather than failing the
//! request.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use studygate_core::{Error, Result};

use crate::kv::KvStore;

/// Durable [`KvStore`] over Redis.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to Redis. Fails fast when the URL is malformed or the first
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_secs(1))
            .set_response_timeout(Duration::from_secs(2));

        let client =
            Client::open(redis_url).map_err(|e| Error::kv("connect", e.to_string()))?;
        let manager = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "redis connection failed");
                Error::kv("connect", e.to_string())
            })?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|e| Error::kv("get", e.to_string()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.manager.clone();
        match ttl {
            Some(ttl) => conn.set_ex(key, value, ttl.as_secs().max(1)).await,
            None => conn.set(key, value).await,
        }
        .map_err(|e| Error::kv("put", e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del(key)
            .await
            .map_err(|e| Error::kv("delete", e.to_string()))
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let pattern = format!("{prefix}*");
        let mut iter: redis::AsyncIter<'_, String> = conn
            .scan_match(pattern)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "redis scan failed");
                Error::kv("scan", e.to_string())
            })?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}
