//! Durable key-value store abstraction.
//!
//! Values are opaque strings (callers serialize JSON). Expiry is the
//! store's responsibility: entries written with a TTL must not be
//! returned once it has passed.

use std::time::Duration;

use async_trait::async_trait;
use studygate_core::constants::{RATE_LIMIT_KEY_PREFIX, SNAPSHOT_KEY_PREFIX};
use studygate_core::Result;

/// Trait for the durable key-value store.
/// This abstraction allows for testing without mocking by providing
/// different implementations for production and test environments.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, optionally expiring after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove a value; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List the keys starting with `prefix`.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// KV key for a rate-limit record.
#[must_use]
pub fn rate_limit_key(identity: &str) -> String {
    format!("{RATE_LIMIT_KEY_PREFIX}{identity}")
}

/// KV key for a cached listing snapshot, addressed by the ETag digest.
#[must_use]
pub fn snapshot_key(etag_hex: &str) -> String {
    format!("{SNAPSHOT_KEY_PREFIX}{etag_hex}")
}
