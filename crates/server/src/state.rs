//! Shared application state, built once at startup.

use std::sync::Arc;

use reqwest::Client;
use studygate_core::time::unix_now;
use studygate_core::Config;
use studygate_ratelimit::RateLimiter;
use studygate_store::{
    KvStore, MemoryStore, MetadataClient, ObjectStoreClient, RedisStore,
};

/// Everything the handlers need, behind one `Arc`.
pub struct AppState {
    pub config: Config,
    /// Durable KV store for rate-limit records, listing snapshots, and
    /// runtime config overrides.
    pub kv: Arc<dyn KvStore>,
    pub metadata: MetadataClient,
    pub objects: ObjectStoreClient,
    pub limiter: RateLimiter,
    /// Unix seconds at startup, reported by the health endpoint.
    pub started_at: u64,
}

impl AppState {
    /// Connect the backends described by `config`.
    ///
    /// Redis trouble is not fatal here. The service keeps answering with the
    /// in-memory store, so a cache outage never takes streaming down with it.
    pub async fn new(config: Config) -> Arc<Self> {
        let kv: Arc<dyn KvStore> = match config.redis_url.as_deref() {
            Some(url) => match RedisStore::connect(url).await {
                Ok(store) => {
                    tracing::info!("connected to redis");
                    Arc::new(store)
                }
                Err(error) => {
                    tracing::warn!(%error, "redis unavailable, falling back to in-memory store");
                    Arc::new(MemoryStore::new())
                }
            },
            None => {
                tracing::info!("no redis configured, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Self::from_parts(config, kv)
    }

    /// Assemble state around an already-built KV store. The HTTP clients are
    /// constructed from the config's base URLs.
    pub fn from_parts(config: Config, kv: Arc<dyn KvStore>) -> Arc<Self> {
        let http = Client::new();
        let metadata = MetadataClient::new(http.clone(), &config.metadata_url, &config.metadata_key);
        let objects = ObjectStoreClient::new(
            http,
            &config.storage_url,
            &config.storage_key,
            &config.storage_bucket,
        );
        let limiter = RateLimiter::new(kv.clone(), config.rate_limit);

        Arc::new(Self {
            config,
            kv,
            metadata,
            objects,
            limiter,
            started_at: unix_now(),
        })
    }
}
