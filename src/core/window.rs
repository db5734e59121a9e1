//! Window partitioning
//!
//! Orders deduplicated events by time, folds them into fixed-duration
//! rolling windows, and selects the window containing the query instant.

use chrono::{DateTime, Duration, Utc};

use crate::core::types::{SessionWindow, UsageEvent};
use crate::utils::Timezone;

/// Restrict events to the current calendar day: local midnight up to `now`.
///
/// Quotas reset at least daily in normal use; excluding stale days bounds
/// the history scanned and keeps long-closed windows out of the fold.
/// Events stamped after `now` are excluded too, so no window can start in
/// the future of the query instant.
pub(crate) fn filter_current_day(
    events: Vec<UsageEvent>,
    now: DateTime<Utc>,
    timezone: Timezone,
) -> Vec<UsageEvent> {
    let today = timezone.local_date(now);
    events
        .into_iter()
        .filter(|event| event.timestamp <= now && timezone.local_date(event.timestamp) == today)
        .collect()
}

/// Fold time-sorted events into non-overlapping rolling windows.
///
/// An event joins the open window while its timestamp is at or before the
/// window's end (boundary inclusive); the first event past the end closes
/// the window and opens a new one anchored at its own timestamp. The sort
/// is stable, so same-instant events keep their input order.
pub(crate) fn partition(mut events: Vec<UsageEvent>, window_duration: Duration) -> Vec<SessionWindow> {
    events.sort_by_key(|event| event.timestamp);

    let mut windows: Vec<SessionWindow> = Vec::new();
    for event in events {
        match windows.last_mut() {
            Some(open) if open.admits(event.timestamp) => open.push(event),
            _ => windows.push(SessionWindow::open(event, window_duration)),
        }
    }
    windows
}

/// The window whose `[start_time, end_time]` interval contains `now`.
///
/// Windows produced by `partition` never overlap, but callers may hand in
/// pathological sequences where more than one interval contains `now`; the
/// latest-starting window represents the most current activity and wins.
pub(crate) fn active_window(
    windows: Vec<SessionWindow>,
    now: DateTime<Utc>,
) -> Option<SessionWindow> {
    let mut active = None;
    for window in windows {
        if window.contains(now) {
            active = Some(window);
        }
    }
    active
}
