//! Session-to-capability bridge.
//!
//! The deliberate escape path for clients whose capability token expired
//! mid-session: instead of bouncing them through the login flow, a valid
//! access-type session credential re-mints a fresh wildcard token on the
//! spot. The caller surfaces it in the `X-Stream-Token` response header so
//! the client can persist the replacement.

use axum::http::HeaderMap;
use studygate_core::constants::{BRIDGE_TOKEN_TTL_SECS, WILDCARD_RESOURCE_ID};
use studygate_core::time::unix_now;

use crate::redact::redact;
use crate::session::{session_credential, verify_session};
use crate::token;

/// Attempt to re-authorize a request whose capability token was rejected
/// (or absent). Returns the freshly minted wildcard token, or `None` when
/// no acceptable session credential is present; `None` is terminal and the
/// caller responds 401.
#[must_use]
pub fn reauthorize_via_session(
    rejected_token: Option<&str>,
    headers: &HeaderMap,
    secret: &str,
) -> Option<String> {
    if let Some(rejected) = rejected_token {
        match token::decode(rejected) {
            Some(claims) => tracing::debug!(
                token = %redact(rejected),
                expired = claims.is_expired(unix_now()),
                "stream token rejected, trying session fallback"
            ),
            None => tracing::debug!(
                token = %redact(rejected),
                "structurally invalid stream token, trying session fallback"
            ),
        }
    }

    let credential = session_credential(headers)?;
    let session = verify_session(credential, secret)?;
    if !session.is_access() {
        tracing::debug!(subject = %session.sub, "session credential is not access-type");
        return None;
    }

    tracing::debug!(subject = %session.sub, "re-minting wildcard stream token via session");
    Some(token::mint(WILDCARD_RESOURCE_ID, BRIDGE_TOKEN_TTL_SECS, secret))
}
