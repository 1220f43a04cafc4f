//! Session credentials (portal login JWTs) and credential discovery.
//!
//! Sessions are HS256 JWTs issued by the login service and verified here
//! with the shared signing secret. Requests carry them either as
//! `Authorization: Bearer <jwt>` or in the session cookie.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use studygate_core::constants::SESSION_COOKIE_NAME;
use studygate_core::{Error, Result};

/// Credential class. Only `access` tokens authorize anything in this
/// service; `refresh` tokens exist solely for the login service's renew
/// flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Standard JWT subject: the account id.
    pub sub: String,

    /// Credential class, serialized as `type`.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Optional embedded profile snapshot. Opaque to this service; carried
    /// so clients can render a name without another lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,

    /// Issued-at (unix seconds).
    pub iat: u64,

    /// Expiry (unix seconds).
    pub exp: u64,
}

impl SessionClaims {
    /// Whether this credential may authorize requests here.
    #[must_use]
    pub fn is_access(&self) -> bool {
        self.token_type == TokenType::Access
    }
}

/// Verify a session JWT. `None` covers every failure mode: bad signature,
/// expired, malformed, or claims that do not fit [`SessionClaims`].
#[must_use]
pub fn verify_session(jwt: &str, secret: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<SessionClaims>(
        jwt,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

/// Sign a session JWT. Issuance lives in the login service; this helper
/// exists for the renew path of embedded deployments and for the test
/// suites.
pub fn issue_session(claims: &SessionClaims, secret: &str) -> Result<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::configuration(format!("failed to sign session credential: {e}")))
}

/// Extract a bearer credential from the `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract a cookie value by name from the `Cookie` header.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Discover a session credential: bearer header first, then the session
/// cookie.
#[must_use]
pub fn session_credential(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_value(headers, SESSION_COOKIE_NAME))
}
