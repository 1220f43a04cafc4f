//! Explicit stream-token minting for logged-in clients.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use studygate_auth::{session_credential, token, verify_session, SessionClaims};
use studygate_core::constants::{
    MINT_TTL_DEFAULT_SECS, MINT_TTL_MAX_SECS, MINT_TTL_MIN_SECS, WILDCARD_RESOURCE_ID,
};
use studygate_core::time::unix_now;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MintRequest {
    /// Resource id to bind the grant to; the wildcard when omitted.
    #[serde(default)]
    pub id: Option<String>,
    /// Requested lifetime in seconds, clamped to the supported bounds.
    #[serde(default)]
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    pub token: String,
    pub expires_at: u64,
}

/// `POST /resources/stream-token`
pub async fn mint_stream_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<MintRequest>, JsonRejection>,
) -> ApiResult<Json<MintResponse>> {
    let session = session_credential(&headers)
        .and_then(|jwt| verify_session(jwt, &state.config.signing_secret))
        .filter(SessionClaims::is_access)
        .ok_or(ApiError::Unauthorized)?;

    let request = match body {
        Ok(Json(request)) => request,
        // No body at all is fine; it mints the default wildcard grant.
        Err(JsonRejection::MissingJsonContentType(_)) => MintRequest::default(),
        Err(_) => return Err(ApiError::BadRequest),
    };

    let resource_id = request
        .id
        .unwrap_or_else(|| WILDCARD_RESOURCE_ID.to_string());
    let ttl = request
        .ttl
        .unwrap_or(MINT_TTL_DEFAULT_SECS)
        .clamp(MINT_TTL_MIN_SECS, MINT_TTL_MAX_SECS);

    let now = unix_now();
    let minted = token::mint_at(&resource_id, ttl, &state.config.signing_secret, now);
    tracing::info!(subject = %session.sub, resource = %resource_id, ttl, "minted stream token");

    Ok(Json(MintResponse {
        token: minted,
        expires_at: now + ttl,
    }))
}
