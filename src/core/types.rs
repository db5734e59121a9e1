//! Core data types for the session-window engine
//!
//! Every value here is recomputed from the raw log batch on each cycle and
//! never mutated after the cycle that built it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::consts::{BURN_WINDOW_MINUTES, SESSION_WINDOW_HOURS};
use crate::utils::Timezone;

/// Token counts for a single event or a window total
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct TokenUsage {
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_creation_tokens: u64,
    pub(crate) cache_read_tokens: u64,
}

impl TokenUsage {
    pub(crate) fn add(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
    }

    /// Tokens that draw down the rolling quota. Cache creation and cache
    /// reads are tracked and reported but do not count against the limit.
    pub(crate) fn quota_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One usage-bearing record extracted from a log line
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UsageEvent {
    /// Logical identity. The same event can appear verbatim in more than
    /// one log file; two events with the same id are the same occurrence.
    pub(crate) id: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) role: String,
    pub(crate) usage: TokenUsage,
}

/// A maximal run of events within one fixed-duration rolling window.
///
/// Windows are built purely from event timestamps; they are not aligned to
/// the wall clock. The closing boundary is inclusive: an event stamped
/// exactly at `end_time` belongs to this window, not a new one.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionWindow {
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) end_time: DateTime<Utc>,
    pub(crate) last_event_time: DateTime<Utc>,
    pub(crate) events: Vec<UsageEvent>,
}

impl SessionWindow {
    /// Open a new window anchored at `first`'s timestamp.
    pub(crate) fn open(first: UsageEvent, duration: Duration) -> Self {
        SessionWindow {
            start_time: first.timestamp,
            end_time: first.timestamp + duration,
            last_event_time: first.timestamp,
            events: vec![first],
        }
    }

    /// Whether an event at `timestamp` still belongs to this window.
    pub(crate) fn admits(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp <= self.end_time
    }

    pub(crate) fn push(&mut self, event: UsageEvent) {
        if event.timestamp > self.last_event_time {
            self.last_event_time = event.timestamp;
        }
        self.events.push(event);
    }

    /// Whether `instant` falls within `[start_time, end_time]`.
    pub(crate) fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant <= self.end_time
    }

    pub(crate) fn totals(&self) -> TokenUsage {
        let mut totals = TokenUsage::default();
        for event in &self.events {
            totals.add(&event.usage);
        }
        totals
    }
}

/// Metrics for the currently active window
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionMetrics {
    pub(crate) usage: TokenUsage,
    /// Quota-relevant total: input + output tokens only
    pub(crate) total_tokens: u64,
    pub(crate) event_count: usize,
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) last_event_time: DateTime<Utc>,
    pub(crate) end_time: DateTime<Utc>,
    pub(crate) time_remaining: Duration,
    pub(crate) is_active: bool,
    /// Quota tokens per minute over the trailing burn window
    pub(crate) burn_rate: f64,
    pub(crate) estimated_time_to_limit: Option<Duration>,
}

/// Plan settings consumed (not owned) by the engine
#[derive(Debug, Clone)]
pub(crate) struct PlanConfig {
    pub(crate) plan_name: String,
    pub(crate) token_limit: Option<u64>,
}

/// Tunable engine parameters.
///
/// Explicit rather than hardcoded so tests can run with compressed time
/// scales.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineParams {
    pub(crate) window_duration: Duration,
    pub(crate) burn_window: Duration,
    pub(crate) timezone: Timezone,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            window_duration: Duration::hours(SESSION_WINDOW_HOURS),
            burn_window: Duration::minutes(BURN_WINDOW_MINUTES),
            timezone: Timezone::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u64, output: u64, cache_c: u64, cache_r: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
            cache_creation_tokens: cache_c,
            cache_read_tokens: cache_r,
        }
    }

    fn event(id: &str, ts: &str, u: TokenUsage) -> UsageEvent {
        UsageEvent {
            id: id.to_string(),
            timestamp: ts.parse().unwrap(),
            role: "assistant".to_string(),
            usage: u,
        }
    }

    #[test]
    fn token_usage_default_all_zero() {
        let u = TokenUsage::default();
        assert_eq!(u.input_tokens, 0);
        assert_eq!(u.output_tokens, 0);
        assert_eq!(u.cache_creation_tokens, 0);
        assert_eq!(u.cache_read_tokens, 0);
        assert_eq!(u.quota_tokens(), 0);
    }

    #[test]
    fn quota_tokens_excludes_cache_counts() {
        let u = usage(100, 50, 9_999, 123_456);
        assert_eq!(u.quota_tokens(), 150);
    }

    #[test]
    fn token_usage_add_accumulates_all_fields() {
        let mut a = usage(10, 20, 5, 3);
        a.add(&usage(100, 200, 50, 30));
        assert_eq!(a, usage(110, 220, 55, 33));
    }

    #[test]
    fn window_open_sets_bounds_from_first_event() {
        let w = SessionWindow::open(
            event("a", "2026-02-06T10:00:00Z", usage(1, 1, 0, 0)),
            Duration::hours(5),
        );
        assert_eq!(w.start_time, "2026-02-06T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(w.end_time, "2026-02-06T15:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(w.last_event_time, w.start_time);
        assert_eq!(w.events.len(), 1);
    }

    #[test]
    fn window_admits_boundary_inclusive() {
        let w = SessionWindow::open(
            event("a", "2026-02-06T10:00:00Z", TokenUsage::default()),
            Duration::hours(5),
        );
        assert!(w.admits("2026-02-06T15:00:00Z".parse().unwrap()));
        assert!(!w.admits("2026-02-06T15:00:01Z".parse().unwrap()));
    }

    #[test]
    fn window_contains_both_ends_inclusive() {
        let w = SessionWindow::open(
            event("a", "2026-02-06T10:00:00Z", TokenUsage::default()),
            Duration::hours(5),
        );
        assert!(w.contains("2026-02-06T10:00:00Z".parse().unwrap()));
        assert!(w.contains("2026-02-06T15:00:00Z".parse().unwrap()));
        assert!(!w.contains("2026-02-06T09:59:59Z".parse().unwrap()));
        assert!(!w.contains("2026-02-06T15:00:01Z".parse().unwrap()));
    }

    #[test]
    fn window_push_advances_last_event_time() {
        let mut w = SessionWindow::open(
            event("a", "2026-02-06T10:00:00Z", TokenUsage::default()),
            Duration::hours(5),
        );
        w.push(event("b", "2026-02-06T11:30:00Z", TokenUsage::default()));
        assert_eq!(
            w.last_event_time,
            "2026-02-06T11:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        // same-instant push keeps the bookkeeping stable
        w.push(event("c", "2026-02-06T11:30:00Z", TokenUsage::default()));
        assert_eq!(
            w.last_event_time,
            "2026-02-06T11:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(w.events.len(), 3);
    }

    #[test]
    fn window_totals_sums_member_events() {
        let mut w = SessionWindow::open(
            event("a", "2026-02-06T10:00:00Z", usage(100, 50, 10, 20)),
            Duration::hours(5),
        );
        w.push(event("b", "2026-02-06T10:05:00Z", usage(200, 100, 30, 40)));
        assert_eq!(w.totals(), usage(300, 150, 40, 60));
    }

    #[test]
    fn engine_params_defaults() {
        let params = EngineParams::default();
        assert_eq!(params.window_duration, Duration::hours(5));
        assert_eq!(params.burn_window, Duration::minutes(10));
    }
}
