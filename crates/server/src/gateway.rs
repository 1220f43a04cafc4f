//! The resource stream gateway.
//!
//! Streams a stored object to the client after three gates pass: the rate
//! limiter admits the request, the resource row resolves, and the caller
//! presents a valid capability token (or holds a session good enough to
//! re-mint one). Byte-range semantics belong to the storage backend; the
//! gateway forwards `Range` and relays whatever status comes back.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::{ACCEPT_RANGES, RANGE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use studygate_auth::{bearer_token, reauthorize_via_session, verify};
use studygate_core::constants::STREAM_TOKEN_HEADER;
use studygate_ratelimit::{derive_identity, RateLimitDecision};
use studygate_store::{ResourcePath, ResourceRecord};

use crate::error::{rate_limit_headers, ApiError, ApiResult};
use crate::state::AppState;

/// Response headers copied from the storage backend. Everything else stays
/// behind the proxy.
const PASSTHROUGH_HEADERS: &[&str] = &[
    "content-type",
    "content-length",
    "content-range",
    "content-disposition",
    "accept-ranges",
    "cache-control",
    "last-modified",
    "etag",
];

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

/// `GET|HEAD /resources/:id/stream`
pub async fn stream_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    method: Method,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|_| ApiError::BadRequest)?;
    let decision = gate(&state, &headers).await?;
    let record = state.metadata.fetch_by_id(&id).await?;
    stream_record(&state, record, method, &query, &headers, decision).await
}

/// `GET|HEAD /files/:semester/:subject/:unit/:filename`
pub async fn stream_by_path(
    State(state): State<Arc<AppState>>,
    Path((semester, subject, unit, filename)): Path<(String, String, String, String)>,
    method: Method,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|_| ApiError::BadRequest)?;
    let decision = gate(&state, &headers).await?;
    let record = state
        .metadata
        .fetch_by_path(&ResourcePath {
            semester,
            subject,
            unit,
            filename,
        })
        .await?;
    stream_record(&state, record, method, &query, &headers, decision).await
}

/// Run the rate limiter for this request, consuming one window slot.
async fn gate(state: &AppState, headers: &HeaderMap) -> ApiResult<RateLimitDecision> {
    let identity = derive_identity(
        headers,
        &state.config.trusted_ip_header,
        &state.config.signing_secret,
    );
    let decision = state.limiter.check(&identity, true).await;
    if decision.allowed {
        Ok(decision)
    } else {
        Err(ApiError::RateLimited(decision))
    }
}

async fn stream_record(
    state: &AppState,
    record: Option<ResourceRecord>,
    method: Method,
    query: &StreamQuery,
    headers: &HeaderMap,
    decision: RateLimitDecision,
) -> ApiResult<Response> {
    let record = record.ok_or(ApiError::NotFound)?;
    // A row without a stored object is as absent as no row at all.
    let storage_key = record.storage_key.clone().ok_or(ApiError::NotFound)?;

    // Token from the query string first, then the bearer slot. When neither
    // verifies, a valid access session re-mints a wildcard token on the spot.
    let presented = query.token.as_deref().or_else(|| bearer_token(headers));
    let minted = match presented {
        Some(token) if verify(token, &record.id, &state.config.signing_secret) => None,
        _ => {
            let token = reauthorize_via_session(presented, headers, &state.config.signing_secret)
                .ok_or(ApiError::Unauthorized)?;
            tracing::debug!(resource = %record.id, "re-minted stream token from session");
            Some(token)
        }
    };

    let mut response = if method == Method::HEAD {
        let upstream = state.objects.head(&storage_key).await?;
        let mut response = relay(&upstream, Body::empty());
        if !response.headers().contains_key(ACCEPT_RANGES) {
            response
                .headers_mut()
                .insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        }
        response
    } else {
        let range = headers.get(RANGE).and_then(|v| v.to_str().ok());
        let upstream = state.objects.fetch(&storage_key, range).await?;
        let (status, copied) = relay_parts(&upstream);
        let mut response = (status, Body::from_stream(upstream.bytes_stream())).into_response();
        response.headers_mut().extend(copied);
        response
    };

    let headers = response.headers_mut();
    headers.extend(rate_limit_headers(&decision));
    if let Some(token) = minted {
        if let Ok(value) = HeaderValue::from_str(&token) {
            headers.insert(HeaderName::from_static(STREAM_TOKEN_HEADER), value);
        }
    }
    Ok(response)
}

/// Build a response that mirrors the backend's status and whitelisted
/// headers around the given body.
fn relay(upstream: &reqwest::Response, body: Body) -> Response {
    let (status, copied) = relay_parts(upstream);
    let mut response = (status, body).into_response();
    response.headers_mut().extend(copied);
    response
}

// The storage client and this server sit on different `http` major
// versions, so header values cross by bytes rather than by type.
fn relay_parts(upstream: &reqwest::Response) -> (StatusCode, HeaderMap) {
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut copied = HeaderMap::new();
    for &name in PASSTHROUGH_HEADERS {
        if let Some(value) = upstream.headers().get(name) {
            if let Ok(value) = HeaderValue::from_bytes(value.as_bytes()) {
                copied.insert(HeaderName::from_static(name), value);
            }
        }
    }
    (status, copied)
}
