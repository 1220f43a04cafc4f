//! Capability-token codec.
//!
//! Wire format: `base64url(payload) + "." + base64url(hmac_sha256(payload))`
//! with the payload being compact JSON of the shape `{"id": ..., "exp": ...}`.
//! Both segments use the unpadded URL-safe alphabet so tokens survive query
//! strings untouched.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use studygate_core::time::unix_now;

type HmacSha256 = Hmac<Sha256>;

/// Payload of a capability token. Both fields are optional on the wire;
/// the verifier treats an absent `id` as unrestricted and an absent `exp`
/// as non-expiring. Tokens minted here always carry both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl StreamTokenClaims {
    /// Whether the token's expiry, when present, has passed. An expiry
    /// exactly equal to `now` is still valid.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.exp.is_some_and(|exp| now > exp)
    }
}

/// Mint a capability token for `resource_id` valid for `ttl_secs`.
#[must_use]
pub fn mint(resource_id: &str, ttl_secs: u64, secret: &str) -> String {
    mint_at(resource_id, ttl_secs, secret, unix_now())
}

/// Deterministic variant of [`mint`] with an explicit clock, for callers
/// that need a known expiry.
#[must_use]
pub fn mint_at(resource_id: &str, ttl_secs: u64, secret: &str, now: u64) -> String {
    let payload = serde_json::json!({
        "id": resource_id,
        "exp": now.saturating_add(ttl_secs),
    })
    .to_string();
    let signature = sign(payload.as_bytes(), secret.as_bytes());
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Structurally decode a token without checking its signature or expiry.
/// Used for diagnostics on already-rejected tokens; never for authorization.
#[must_use]
pub fn decode(token: &str) -> Option<StreamTokenClaims> {
    let mut segments = token.split('.');
    let payload_b64 = segments.next()?;
    let _signature_b64 = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    serde_json::from_slice(&payload).ok()
}

/// HMAC-SHA256 over the exact payload bytes.
pub(crate) fn sign(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}
