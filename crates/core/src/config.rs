//! Process-wide configuration loaded from `STUDYGATE_*` environment
//! variables.
//!
//! Loading happens exactly once at startup. Validation is strict: a missing
//! signing secret is a startup failure, so no request handler ever runs
//! without one.

use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::errors::{Error, Result};

/// Rate limiter tunables. Defaults match the production values; every field
/// can be overridden through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Sliding window length in seconds.
    pub window_secs: u64,
    /// Admitted requests per window, clamped to the configured bounds.
    pub max_requests: u32,
    /// First-violation penalty in seconds.
    pub base_penalty_secs: u64,
    /// Geometric escalation factor applied per prior violation.
    pub penalty_multiplier: u32,
    /// Penalty ceiling in seconds; also the persistence TTL for records.
    pub max_penalty_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: RATE_LIMIT_WINDOW_SECS,
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            base_penalty_secs: RATE_LIMIT_BASE_PENALTY_SECS,
            penalty_multiplier: RATE_LIMIT_PENALTY_MULTIPLIER,
            max_penalty_secs: RATE_LIMIT_MAX_PENALTY_SECS,
        }
    }
}

/// Validated service configuration.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Secret for capability-token HMACs and session credential signatures.
    pub signing_secret: String,
    /// Base URL of the metadata store (PostgREST-style REST API).
    pub metadata_url: String,
    pub metadata_key: String,
    /// Base URL of the object storage backend; defaults to the metadata URL
    /// when both live behind the same host.
    pub storage_url: String,
    pub storage_key: String,
    pub storage_bucket: String,
    /// Durable KV store. `None` runs with the in-memory store only.
    pub redis_url: Option<String>,
    /// Proxy-supplied client IP header, consulted before `x-forwarded-for`.
    pub trusted_ip_header: String,
    pub rate_limit: RateLimitSettings,
}

// Debug output gets logged at startup; secrets never appear in it.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("signing_secret", &"<redacted>")
            .field("metadata_url", &self.metadata_url)
            .field("metadata_key", &"<redacted>")
            .field("storage_url", &self.storage_url)
            .field("storage_key", &"<redacted>")
            .field("storage_bucket", &self.storage_bucket)
            .field("redis_url", &self.redis_url.as_deref().map(|_| "<redacted>"))
            .field("trusted_ip_header", &self.trusted_ip_header)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let signing_secret = required(SIGNING_SECRET_VAR)?;
        let metadata_url = normalize_base_url(required(METADATA_URL_VAR)?);
        let metadata_key = required(METADATA_KEY_VAR)?;

        let storage_url = optional(STORAGE_URL_VAR)
            .map(normalize_base_url)
            .unwrap_or_else(|| metadata_url.clone());
        let storage_key = optional(STORAGE_KEY_VAR).unwrap_or_else(|| metadata_key.clone());
        let storage_bucket =
            optional(STORAGE_BUCKET_VAR).unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());

        let rate_limit = RateLimitSettings {
            window_secs: parsed(RATE_LIMIT_WINDOW_VAR, RATE_LIMIT_WINDOW_SECS)?,
            max_requests: clamp_max_requests(parsed(
                RATE_LIMIT_MAX_REQUESTS_VAR,
                RATE_LIMIT_MAX_REQUESTS,
            )?),
            base_penalty_secs: parsed(RATE_LIMIT_BASE_PENALTY_VAR, RATE_LIMIT_BASE_PENALTY_SECS)?,
            penalty_multiplier: parsed(RATE_LIMIT_MULTIPLIER_VAR, RATE_LIMIT_PENALTY_MULTIPLIER)?,
            max_penalty_secs: parsed(RATE_LIMIT_MAX_PENALTY_VAR, RATE_LIMIT_MAX_PENALTY_SECS)?,
        };

        Ok(Self {
            port: parsed(PORT_VAR, DEFAULT_PORT)?,
            signing_secret,
            metadata_url,
            metadata_key,
            storage_url,
            storage_key,
            storage_bucket,
            redis_url: optional(REDIS_URL_VAR),
            trusted_ip_header: optional(TRUSTED_IP_HEADER_VAR)
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_TRUSTED_IP_HEADER.to_string()),
            rate_limit,
        })
    }
}

/// Clamp a requested per-window admission limit to the supported bounds.
/// Shared with the runtime override read from the KV config key.
#[must_use]
pub fn clamp_max_requests(raw: u32) -> u32 {
    raw.clamp(RATE_LIMIT_MAX_REQUESTS_FLOOR, RATE_LIMIT_MAX_REQUESTS_CEIL)
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| Error::configuration(format!("{name} is not set")))
}

fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::configuration(format!("invalid {name} '{raw}': {e}"))),
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        PORT_VAR,
        SIGNING_SECRET_VAR,
        METADATA_URL_VAR,
        METADATA_KEY_VAR,
        STORAGE_URL_VAR,
        STORAGE_KEY_VAR,
        STORAGE_BUCKET_VAR,
        REDIS_URL_VAR,
        TRUSTED_IP_HEADER_VAR,
        RATE_LIMIT_WINDOW_VAR,
        RATE_LIMIT_MAX_REQUESTS_VAR,
        RATE_LIMIT_BASE_PENALTY_VAR,
        RATE_LIMIT_MULTIPLIER_VAR,
        RATE_LIMIT_MAX_PENALTY_VAR,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn set_minimum() {
        std::env::set_var(SIGNING_SECRET_VAR, "test-secret");
        std::env::set_var(METADATA_URL_VAR, "https://meta.example.com/");
        std::env::set_var(METADATA_KEY_VAR, "service-key");
    }

    #[test]
    #[serial]
    fn missing_signing_secret_is_a_startup_error() {
        clear_env();
        std::env::set_var(METADATA_URL_VAR, "https://meta.example.com");
        std::env::set_var(METADATA_KEY_VAR, "service-key");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(SIGNING_SECRET_VAR));
    }

    #[test]
    #[serial]
    fn minimal_environment_fills_defaults() {
        clear_env();
        set_minimum();

        let config = Config::from_env().expect("minimal env should load");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.metadata_url, "https://meta.example.com");
        assert_eq!(config.storage_url, config.metadata_url);
        assert_eq!(config.storage_key, config.metadata_key);
        assert_eq!(config.storage_bucket, DEFAULT_STORAGE_BUCKET);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.trusted_ip_header, DEFAULT_TRUSTED_IP_HEADER);
        assert_eq!(config.rate_limit, RateLimitSettings::default());
    }

    #[test]
    #[serial]
    fn overrides_are_parsed_and_clamped() {
        clear_env();
        set_minimum();
        std::env::set_var(PORT_VAR, "9000");
        std::env::set_var(RATE_LIMIT_MAX_REQUESTS_VAR, "5000");
        std::env::set_var(TRUSTED_IP_HEADER_VAR, "CF-Connecting-IP");

        let config = Config::from_env().expect("env should load");
        assert_eq!(config.port, 9000);
        assert_eq!(config.rate_limit.max_requests, RATE_LIMIT_MAX_REQUESTS_CEIL);
        assert_eq!(config.trusted_ip_header, "cf-connecting-ip");
    }

    #[test]
    #[serial]
    fn invalid_numeric_value_is_rejected() {
        clear_env();
        set_minimum();
        std::env::set_var(PORT_VAR, "not-a-port");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(PORT_VAR));
    }

    #[test]
    #[serial]
    fn debug_output_redacts_secrets() {
        clear_env();
        set_minimum();

        let config = Config::from_env().expect("env should load");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("test-secret"));
        assert!(!rendered.contains("service-key"));
    }

    #[test]
    fn max_requests_clamp_bounds() {
        assert_eq!(clamp_max_requests(0), RATE_LIMIT_MAX_REQUESTS_FLOOR);
        assert_eq!(clamp_max_requests(40), 40);
        assert_eq!(clamp_max_requests(100_000), RATE_LIMIT_MAX_REQUESTS_CEIL);
    }
}
