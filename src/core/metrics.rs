//! Active-window metrics
//!
//! Token subtotals, trailing burn rate, and forward projection to a plan's
//! token ceiling.

use chrono::{DateTime, Duration, Utc};

use crate::core::types::{SessionMetrics, SessionWindow};

/// Summarize an active window at `now`.
pub(crate) fn aggregate(
    window: &SessionWindow,
    now: DateTime<Utc>,
    burn_window: Duration,
    token_limit: Option<u64>,
) -> SessionMetrics {
    let usage = window.totals();
    let total_tokens = usage.quota_tokens();
    let rate = burn_rate(window, now, burn_window);

    SessionMetrics {
        usage,
        total_tokens,
        event_count: window.events.len(),
        start_time: window.start_time,
        last_event_time: window.last_event_time,
        end_time: window.end_time,
        time_remaining: (window.end_time - now).max(Duration::zero()),
        is_active: window.contains(now),
        burn_rate: rate,
        estimated_time_to_limit: token_limit
            .and_then(|limit| time_to_limit(total_tokens, limit, rate)),
    }
}

/// Quota tokens per minute over the trailing burn window.
///
/// The divisor is the span from the earliest retained event to `now`, not
/// the fixed burn-window length: a burst that started two minutes ago reads
/// as its two-minute rate instead of being diluted over the full window.
pub(crate) fn burn_rate(window: &SessionWindow, now: DateTime<Utc>, burn_window: Duration) -> f64 {
    let cutoff = now - burn_window;

    let mut tokens: u64 = 0;
    let mut earliest: Option<DateTime<Utc>> = None;
    for event in &window.events {
        if event.timestamp >= cutoff {
            tokens += event.usage.quota_tokens();
            earliest = Some(match earliest {
                Some(seen) => seen.min(event.timestamp),
                None => event.timestamp,
            });
        }
    }

    let Some(earliest) = earliest else {
        return 0.0;
    };
    let elapsed_minutes = (now - earliest).num_seconds() as f64 / 60.0;
    if elapsed_minutes <= 0.0 {
        return 0.0;
    }
    tokens as f64 / elapsed_minutes
}

/// Projected time until `limit` quota tokens at the current rate.
///
/// No projection when the rate is flat or the ceiling is already reached.
pub(crate) fn time_to_limit(total_tokens: u64, limit: u64, burn_rate: f64) -> Option<Duration> {
    if burn_rate <= 0.0 || total_tokens >= limit {
        return None;
    }
    let minutes = (limit - total_tokens) as f64 / burn_rate;
    Some(Duration::seconds((minutes * 60.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{TokenUsage, UsageEvent};

    fn event(id: &str, ts: &str, input: u64, output: u64) -> UsageEvent {
        UsageEvent {
            id: id.to_string(),
            timestamp: ts.parse().unwrap(),
            role: "assistant".to_string(),
            usage: TokenUsage {
                input_tokens: input,
                output_tokens: output,
                cache_creation_tokens: 7_000,
                cache_read_tokens: 90_000,
            },
        }
    }

    fn window_of(events: Vec<UsageEvent>) -> SessionWindow {
        let mut iter = events.into_iter();
        let mut window = SessionWindow::open(iter.next().unwrap(), Duration::hours(5));
        for e in iter {
            window.push(e);
        }
        window
    }

    fn at(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    #[test]
    fn totals_exclude_cache_tokens_from_quota() {
        let window = window_of(vec![
            event("a", "2026-02-06T10:00:00Z", 100, 50),
            event("b", "2026-02-06T10:05:00Z", 200, 100),
        ]);
        let metrics = aggregate(&window, at("2026-02-06T10:06:00Z"), Duration::minutes(10), None);
        assert_eq!(metrics.total_tokens, 450);
        assert_eq!(metrics.usage.input_tokens, 300);
        assert_eq!(metrics.usage.output_tokens, 150);
        assert_eq!(metrics.usage.cache_creation_tokens, 14_000);
        assert_eq!(metrics.usage.cache_read_tokens, 180_000);
        assert_eq!(
            metrics.total_tokens,
            metrics.usage.input_tokens + metrics.usage.output_tokens
        );
        assert_eq!(metrics.event_count, 2);
    }

    #[test]
    fn time_remaining_counts_down_to_window_end() {
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 1, 1)]);
        let metrics = aggregate(&window, at("2026-02-06T12:00:00Z"), Duration::minutes(10), None);
        assert_eq!(metrics.time_remaining, Duration::hours(3));
        assert!(metrics.is_active);
    }

    #[test]
    fn time_remaining_clamps_at_zero_after_expiry() {
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 1, 1)]);
        let metrics = aggregate(&window, at("2026-02-06T16:00:00Z"), Duration::minutes(10), None);
        assert_eq!(metrics.time_remaining, Duration::zero());
        assert!(!metrics.is_active);
    }

    #[test]
    fn burn_rate_single_event_three_minutes_ago() {
        // 300 quota tokens over 3 elapsed minutes: 100 tokens/minute
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 200, 100)]);
        let rate = burn_rate(&window, at("2026-02-06T10:03:00Z"), Duration::minutes(10));
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn burn_rate_ignores_events_outside_trailing_window() {
        let window = window_of(vec![
            event("a", "2026-02-06T10:00:00Z", 1_000_000, 0),
            event("b", "2026-02-06T11:57:00Z", 200, 100),
        ]);
        let rate = burn_rate(&window, at("2026-02-06T12:00:00Z"), Duration::minutes(10));
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn burn_rate_zero_when_no_recent_events() {
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 500, 500)]);
        let rate = burn_rate(&window, at("2026-02-06T11:00:00Z"), Duration::minutes(10));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn burn_rate_zero_when_elapsed_is_zero() {
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 500, 500)]);
        let rate = burn_rate(&window, at("2026-02-06T10:00:00Z"), Duration::minutes(10));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn time_to_limit_projects_remaining_minutes() {
        // 1000 tokens short of the ceiling at 100 tokens/minute: 10 minutes
        let eta = time_to_limit(43_000, 44_000, 100.0).unwrap();
        assert_eq!(eta, Duration::minutes(10));
    }

    #[test]
    fn time_to_limit_undefined_at_or_past_ceiling() {
        assert!(time_to_limit(44_000, 44_000, 100.0).is_none());
        assert!(time_to_limit(50_000, 44_000, 100.0).is_none());
    }

    #[test]
    fn time_to_limit_undefined_without_burn() {
        assert!(time_to_limit(10, 44_000, 0.0).is_none());
    }

    #[test]
    fn aggregate_threads_limit_into_projection() {
        let window = window_of(vec![event("a", "2026-02-06T10:00:00Z", 200, 100)]);
        let metrics = aggregate(
            &window,
            at("2026-02-06T10:03:00Z"),
            Duration::minutes(10),
            Some(600),
        );
        // 300 used, 300 left at 100/min
        assert_eq!(metrics.estimated_time_to_limit, Some(Duration::minutes(3)));

        let unlimited = aggregate(&window, at("2026-02-06T10:03:00Z"), Duration::minutes(10), None);
        assert!(unlimited.estimated_time_to_limit.is_none());
    }
}
