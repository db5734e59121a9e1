//! Session-window aggregation engine
//!
//! Pure pipeline from raw log lines to active-window metrics:
//! extract → dedupe → partition → aggregate. Every function takes `now`
//! explicitly; nothing here reads the clock or touches the filesystem.

mod dedup;
mod engine;
mod extract;
mod metrics;
mod types;
mod window;

pub(crate) use engine::{
    compute_from_events, compute_session_metrics, compute_windows, extract_batch,
};
pub(crate) use extract::{ExtractStats, extract_line};
pub(crate) use types::{
    EngineParams, PlanConfig, SessionMetrics, SessionWindow, TokenUsage, UsageEvent,
};
