/// Rolling session window length in hours
pub(crate) const SESSION_WINDOW_HOURS: i64 = 5;

/// Trailing window for burn-rate estimation in minutes
pub(crate) const BURN_WINDOW_MINUTES: i64 = 10;

/// Quota-token ceiling per window for the "pro" plan
pub(crate) const PRO_TOKEN_LIMIT: u64 = 44_000;

/// Quota-token ceiling per window for the "max5" plan
pub(crate) const MAX5_TOKEN_LIMIT: u64 = 88_000;

/// Quota-token ceiling per window for the "max20" plan
pub(crate) const MAX20_TOKEN_LIMIT: u64 = 220_000;

/// Fallback value when a record carries no role
pub(crate) const UNKNOWN: &str = "unknown";
