//! Error responses for the HTTP surface.
//!
//! Every terminal failure renders the `{"error": <code>}` envelope. The one
//! exception is an upstream status passthrough, which relays the backend's
//! status and text body untouched so range and not-found semantics survive
//! the proxy hop.

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use studygate_core::constants::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
    RATE_LIMIT_VIOLATIONS_HEADER,
};
use studygate_core::Error;
use studygate_ratelimit::RateLimitDecision;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited(RateLimitDecision),

    /// Non-success status from a backend, relayed as-is.
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("bad gateway")]
    BadGateway,
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::UpstreamStatus {
                service,
                status,
                body,
            } => {
                tracing::warn!(service = %service, status, "relaying upstream error status");
                ApiError::UpstreamStatus { status, body }
            }
            other => {
                tracing::error!(error = %other, "request failed on a backend dependency");
                ApiError::BadGateway
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest => envelope(StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized => envelope(StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound => envelope(StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadGateway => envelope(StatusCode::BAD_GATEWAY, "bad_gateway"),
            ApiError::UpstreamStatus { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, body).into_response()
            }
            ApiError::RateLimited(decision) => {
                let mut headers = rate_limit_headers(&decision);
                headers.insert(
                    RETRY_AFTER,
                    HeaderValue::from(decision.retry_after.unwrap_or(0)),
                );
                let body = json!({
                    "error": "rate_limited",
                    "retryAfter": decision.retry_after,
                    "violationCount": decision.violation_count,
                });
                (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
            }
        }
    }
}

fn envelope(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// Limiter outcome headers, attached to rejections and to successful stream
/// responses alike.
pub(crate) fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_LIMIT_HEADER),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_RESET_HEADER),
        HeaderValue::from(decision.reset_at),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_VIOLATIONS_HEADER),
        HeaderValue::from(decision.violation_count),
    );
    headers
}
