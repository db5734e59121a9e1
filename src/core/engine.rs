//! Session metrics facade
//!
//! Composition of extraction, deduplication, partitioning, and aggregation.
//! Deterministic for a fixed batch and `now`; performs no I/O and holds no
//! state between invocations.

use chrono::{DateTime, Utc};

use crate::core::dedup::dedupe;
use crate::core::extract::{ExtractStats, extract_line};
use crate::core::metrics::aggregate;
use crate::core::types::{EngineParams, PlanConfig, SessionMetrics, SessionWindow, UsageEvent};
use crate::core::window::{active_window, filter_current_day, partition};

/// Extract a batch of raw lines into events plus counters.
pub(crate) fn extract_batch<'a, I>(lines: I) -> (Vec<UsageEvent>, ExtractStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = ExtractStats::default();
    let mut events = Vec::new();
    for line in lines {
        if let Some(event) = extract_line(line, &mut stats) {
            events.push(event);
        }
    }
    (events, stats)
}

/// Compute active-session metrics from raw log lines.
///
/// The batch is expected to be the union of all currently-available lines
/// across all log files; duplicates across files are collapsed here.
pub(crate) fn compute_session_metrics<'a, I>(
    lines: I,
    now: DateTime<Utc>,
    plan: &PlanConfig,
    params: &EngineParams,
) -> (Option<SessionMetrics>, ExtractStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let (events, stats) = extract_batch(lines);
    (compute_from_events(events, now, plan, params), stats)
}

/// Same pipeline entered after extraction; the parallel loader calls this
/// with the ordered union of events across all discovered files.
///
/// Returns `None` when no window contains `now`: the quota has fully
/// reset, which is a normal terminal state, not an error.
pub(crate) fn compute_from_events(
    events: Vec<UsageEvent>,
    now: DateTime<Utc>,
    plan: &PlanConfig,
    params: &EngineParams,
) -> Option<SessionMetrics> {
    let events = dedupe(events);
    let events = filter_current_day(events, now, params.timezone);
    let windows = partition(events, params.window_duration);
    active_window(windows, now).map(|window| aggregate(&window, now, params.burn_window, plan.token_limit))
}

/// Full window sequence reconstructed for the current day, closed windows
/// included. For callers that want more than the single active window.
pub(crate) fn compute_windows(
    events: Vec<UsageEvent>,
    now: DateTime<Utc>,
    params: &EngineParams,
) -> Vec<SessionWindow> {
    let events = dedupe(events);
    let events = filter_current_day(events, now, params.timezone);
    partition(events, params.window_duration)
}
