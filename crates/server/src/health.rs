//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use studygate_core::constants::RATE_LIMIT_KEY_PREFIX;
use studygate_core::time::unix_now;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub uptime_secs: u64,
    /// Identities currently tracked by the limiter; -1 when the store scan
    /// fails.
    pub rate_limit_keys: i64,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let rate_limit_keys = match state.kv.list_prefix(RATE_LIMIT_KEY_PREFIX).await {
        Ok(keys) => keys.len() as i64,
        Err(error) => {
            tracing::warn!(%error, "rate-limit key scan failed");
            -1
        }
    };

    Json(HealthStatus {
        status: "ok",
        uptime_secs: unix_now().saturating_sub(state.started_at),
        rate_limit_keys,
    })
}
