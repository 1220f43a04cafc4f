//! Capability tokens and session credentials for the `studygate` service.
//!
//! Two credential kinds live here. The **capability token** is a compact,
//! stateless grant for one resource stream (or every stream, via the
//! wildcard id): an HMAC-signed JSON payload, minted and verified entirely
//! in-process. The **session credential** is the portal's HS256 JWT; this
//! crate only verifies it, issuance belongs to the login service.
//!
//! The [`bridge`] module connects the two: a request whose capability token
//! failed verification but which carries a valid access-type session gets a
//! fresh wildcard token re-minted on the spot.
//!
//! Verification never returns errors. Every failure mode collapses to
//! `false` or `None` so callers cannot accidentally leak why a credential
//! was rejected.

pub mod bridge;
pub mod redact;
pub mod session;
pub mod token;
pub mod verify;

pub use self::bridge::reauthorize_via_session;
pub use self::redact::redact;
pub use self::session::{
    bearer_token, cookie_value, issue_session, session_credential, verify_session, SessionClaims,
    TokenType,
};
pub use self::token::{decode, mint, StreamTokenClaims};
pub use self::verify::verify;
