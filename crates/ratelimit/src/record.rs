//! Persistent rate-limit state and penalty arithmetic.

use serde::{Deserialize, Serialize};
use studygate_core::config::RateLimitSettings;

/// Rate-limit state for one identity, persisted as JSON in the KV store.
/// Requests and violations are tracked separately: a rejected request never
/// enters `requests`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    /// Unix-second timestamps of admitted requests within the sliding
    /// window.
    #[serde(default)]
    pub requests: Vec<u64>,
    /// Unix-second timestamps of limit violations within the penalty
    /// lookback.
    #[serde(default)]
    pub violations: Vec<u64>,
}

impl RateLimitRecord {
    /// Drop entries outside their horizons: requests older than the window,
    /// violations older than the maximum penalty.
    pub fn prune(&mut self, settings: &RateLimitSettings, now: u64) {
        self.requests
            .retain(|&ts| ts + settings.window_secs > now);
        self.violations
            .retain(|&ts| ts + settings.max_penalty_secs > now);
    }

    /// When the oldest retained request leaves the window, freeing a slot.
    #[must_use]
    pub fn reset_at(&self, settings: &RateLimitSettings, now: u64) -> u64 {
        self.requests
            .iter()
            .min()
            .map(|&oldest| oldest + settings.window_secs)
            .unwrap_or(now + settings.window_secs)
    }

    /// Seconds left of the penalty attached to the most recent violation,
    /// `None` when no penalty is active at `now`.
    #[must_use]
    pub fn penalty_remaining(&self, settings: &RateLimitSettings, now: u64) -> Option<u64> {
        let last = self.violations.iter().max().copied()?;
        let until = last.saturating_add(penalty_secs(settings, self.violations.len()));
        (until > now).then(|| until - now)
    }
}

/// Penalty duration for the `violation_count`-th violation (1-based):
/// `base * multiplier^(count - 1)`, capped at the maximum.
#[must_use]
pub fn penalty_secs(settings: &RateLimitSettings, violation_count: usize) -> u64 {
    if violation_count == 0 {
        return 0;
    }
    let exponent = u32::try_from(violation_count - 1).unwrap_or(u32::MAX);
    let escalated = u64::from(settings.penalty_multiplier)
        .checked_pow(exponent)
        .and_then(|factor| settings.base_penalty_secs.checked_mul(factor))
        .unwrap_or(settings.max_penalty_secs);
    escalated.min(settings.max_penalty_secs)
}
