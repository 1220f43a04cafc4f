//! Capability-token verifier.
//!
//! Checks run in order: structure, expiry, resource id, signature. Every
//! failure collapses to `false`; the verifier has no side effects and never
//! panics on untrusted input. The signature comparison is constant-time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use studygate_core::constants::WILDCARD_RESOURCE_ID;
use studygate_core::time::unix_now;
use subtle::ConstantTimeEq;

use crate::token::{sign, StreamTokenClaims};

/// Whether `token` authorizes streaming `expected_id` right now.
#[must_use]
pub fn verify(token: &str, expected_id: &str, secret: &str) -> bool {
    verify_at(token, expected_id, secret, unix_now())
}

/// Deterministic variant of [`verify`] with an explicit clock.
#[must_use]
pub fn verify_at(token: &str, expected_id: &str, secret: &str, now: u64) -> bool {
    let mut segments = token.split('.');
    let (Some(payload_b64), Some(signature_b64), None) =
        (segments.next(), segments.next(), segments.next())
    else {
        return false;
    };

    let Ok(payload) = URL_SAFE_NO_PAD.decode(payload_b64) else {
        return false;
    };
    let Ok(signature) = URL_SAFE_NO_PAD.decode(signature_b64) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<StreamTokenClaims>(&payload) else {
        return false;
    };

    if claims.is_expired(now) {
        return false;
    }
    if let Some(id) = claims.id.as_deref() {
        if id != WILDCARD_RESOURCE_ID && id != expected_id {
            return false;
        }
    }

    // The signature covers the exact decoded payload bytes, so re-encoding
    // differences cannot sneak through.
    let expected = sign(&payload, secret.as_bytes());
    if expected.len() != signature.len() {
        return false;
    }
    expected.ct_eq(signature.as_slice()).into()
}
