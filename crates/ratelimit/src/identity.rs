//! Client identity derivation.
//!
//! Limits are keyed by the authenticated subject when a valid session
//! cookie is present, so one student shares a budget across devices.
//! Anonymous traffic falls back to the client IP as reported by the proxy
//! chain. The two namespaces are prefixed so a subject id can never
//! collide with an IP literal.

use axum::http::HeaderMap;
use studygate_auth::{cookie_value, verify_session};
use studygate_core::constants::SESSION_COOKIE_NAME;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate-limit identity for a request.
#[must_use]
pub fn derive_identity(headers: &HeaderMap, trusted_ip_header: &str, secret: &str) -> String {
    if let Some(session) =
        cookie_value(headers, SESSION_COOKIE_NAME).and_then(|jwt| verify_session(jwt, secret))
    {
        return format!("user:{}", session.sub);
    }
    format!("ip:{}", client_ip(headers, trusted_ip_header))
}

/// Best-effort client IP: the trusted proxy header first, then the first
/// entry of `x-forwarded-for`, else `"unknown"`.
fn client_ip(headers: &HeaderMap, trusted_ip_header: &str) -> String {
    if let Some(ip) = header_str(headers, trusted_ip_header) {
        return ip.to_string();
    }
    if let Some(first) = header_str(headers, FORWARDED_FOR_HEADER)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    {
        return first.to_string();
    }
    UNKNOWN_CLIENT.to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
