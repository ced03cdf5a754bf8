use std::time::Duration;

/// The outcome of counting one request against a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Maximum number of requests per window.
    pub limit: u64,
    /// Number of requests still allowed in the current window.
    pub remaining: u64,
    /// Time until the oldest counted request leaves the window.
    pub reset: Duration,
}
