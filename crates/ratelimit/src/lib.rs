//! Rate limiting for the `studygate` service.
//!
//! Provides identity-keyed rate limiting to prevent abuse and ensure fair
//! resource usage across all clients. A sliding window admits a bounded
//! number of requests; crossing the limit records a violation whose penalty
//! escalates geometrically and is enforced before the window is even
//! consulted.
//!
//! State persists in the durable key-value store so limits survive
//! restarts and are shared between instances. Storage trouble never blocks
//! a request: the limiter degrades to its process-local mirror and fails
//! open.

pub mod identity;
pub mod limiter;
pub mod record;

pub use self::identity::derive_identity;
pub use self::limiter::{RateLimitDecision, RateLimiter};
pub use self::record::RateLimitRecord;
