//! Storage backends for the `studygate` service.
//!
//! ## Key Components
//!
//! - **`kv`**: The [`KvStore`] trait abstracting the durable key-value store
//!   (rate-limit records, listing snapshots, runtime config overrides) plus
//!   the key layout helpers.
//! - **`memory`**: A `DashMap`-backed [`MemoryStore`] with lazy TTL expiry,
//!   used as the rate limiter's fallback mirror and throughout the tests.
//! - **`redis`**: The production [`RedisStore`] over a tokio connection
//!   manager.
//! - **`metadata`**: REST client for the resource metadata store.
//! - **`object`**: REST client for the object storage backend, byte-range
//!   capable, with exactly one retrieval strategy.

pub mod kv;
pub mod memory;
pub mod metadata;
pub mod object;
pub mod redis;

pub use self::kv::{rate_limit_key, snapshot_key, KvStore};
pub use self::memory::MemoryStore;
pub use self::metadata::{MetadataClient, ResourceFilter, ResourcePath, ResourceRecord};
pub use self::object::ObjectStoreClient;
pub use self::redis::RedisStore;
