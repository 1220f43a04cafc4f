//! Wall-clock helpers.
//!
//! Code that depends on the current time takes an explicit `now` parameter
//! in its internal entry points and resolves it through [`unix_now`] only at
//! the public boundary, which keeps expiry and window arithmetic testable
//! without a mocked clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as whole seconds since the unix epoch.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
