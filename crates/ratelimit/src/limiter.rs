//! Sliding-window rate limiter with escalating penalties.
//!
//! Admission control runs in three steps: an active penalty rejects
//! immediately; a full window records a violation and starts a new penalty;
//! otherwise the request is admitted and, when consuming, appended to the
//! window. Records live in the durable KV store under a TTL equal to the
//! maximum penalty, with a process-local mirror taking over whenever the
//! store misbehaves. The load-modify-store sequence is deliberately
//! non-transactional; concurrent checks may briefly under-count, never
//! over-penalize.

use std::sync::Arc;
use std::time::Duration;

use studygate_core::config::{clamp_max_requests, RateLimitSettings};
use studygate_core::constants::CONFIG_KEY_MAX_REQUESTS;
use studygate_core::time::unix_now;
use studygate_store::{rate_limit_key, KvStore, MemoryStore};

use crate::record::{penalty_secs, RateLimitRecord};

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Admission limit in force for this check.
    pub limit: u32,
    /// Window slots left after this request.
    pub remaining: u32,
    /// When the oldest windowed request ages out (unix seconds).
    pub reset_at: u64,
    /// On rejections: seconds until the client may retry.
    pub retry_after: Option<u64>,
    /// Violations currently on record for this identity.
    pub violation_count: u32,
    /// Whether the rejection came from an active penalty rather than the
    /// window filling up this instant.
    pub penalty_active: bool,
}

/// Identity-keyed rate limiter backed by the durable KV store.
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    /// Process-local mirror used while the durable store is unreachable.
    fallback: MemoryStore,
    settings: RateLimitSettings,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, settings: RateLimitSettings) -> Self {
        Self {
            store,
            fallback: MemoryStore::new(),
            settings,
        }
    }

    /// Check `identity` against the limit, recording the request in the
    /// window when `consume` is set.
    pub async fn check(&self, identity: &str, consume: bool) -> RateLimitDecision {
        self.check_at(identity, consume, unix_now()).await
    }

    /// Deterministic variant of [`check`](Self::check) with an explicit
    /// clock.
    pub async fn check_at(&self, identity: &str, consume: bool, now: u64) -> RateLimitDecision {
        // Roughly one check in a hundred sweeps the mirror so entries for
        // identities that never return do not accumulate.
        if fastrand::u32(0..100) == 0 {
            self.fallback.sweep();
        }

        let limit = self.effective_limit().await;
        let key = rate_limit_key(identity);
        let mut record = self.load(&key).await;
        record.prune(&self.settings, now);

        if let Some(retry_after) = record.penalty_remaining(&self.settings, now) {
            tracing::debug!(identity, retry_after, "request rejected by active penalty");
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at: record.reset_at(&self.settings, now),
                retry_after: Some(retry_after),
                violation_count: record.violations.len() as u32,
                penalty_active: true,
            };
        }

        if record.requests.len() as u32 >= limit {
            // The rejected request itself is never added to the window.
            record.violations.push(now);
            let retry_after = penalty_secs(&self.settings, record.violations.len());
            self.persist(&key, &record).await;
            tracing::warn!(
                identity,
                violations = record.violations.len(),
                retry_after,
                "rate limit violated"
            );
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at: record.reset_at(&self.settings, now),
                retry_after: Some(retry_after),
                violation_count: record.violations.len() as u32,
                penalty_active: false,
            };
        }

        if consume {
            record.requests.push(now);
            self.persist(&key, &record).await;
        }

        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(record.requests.len() as u32),
            reset_at: record.reset_at(&self.settings, now),
            retry_after: None,
            violation_count: record.violations.len() as u32,
            penalty_active: false,
        }
    }

    /// Admission limit in force: the runtime override from the config store
    /// when present and well-formed, else the configured default.
    async fn effective_limit(&self) -> u32 {
        match self.store.get(CONFIG_KEY_MAX_REQUESTS).await {
            Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(value) => clamp_max_requests(value),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring malformed rate-limit override");
                    self.settings.max_requests
                }
            },
            Ok(None) => self.settings.max_requests,
            Err(e) => {
                tracing::debug!(error = %e, "rate-limit override read failed, using default");
                self.settings.max_requests
            }
        }
    }

    async fn load(&self, key: &str) -> RateLimitRecord {
        let raw = match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "rate-limit store read failed, using in-memory mirror");
                self.fallback.get(key).await.ok().flatten()
            }
        };

        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding corrupt rate-limit record");
                RateLimitRecord::default()
            }),
            None => RateLimitRecord::default(),
        }
    }

    async fn persist(&self, key: &str, record: &RateLimitRecord) {
        let Ok(raw) = serde_json::to_string(record) else {
            return;
        };
        let ttl = Some(Duration::from_secs(self.settings.max_penalty_secs));
        if let Err(e) = self.store.put(key, &raw, ttl).await {
            tracing::warn!(error = %e, "rate-limit store write failed, mirroring in memory");
            let _ = self.fallback.put(key, &raw, ttl).await;
        }
    }
}
