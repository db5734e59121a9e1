use crate::core::{PlanConfig, SessionMetrics};
use crate::output::format::{format_compact, format_duration, format_rate};

/// Output a single line suitable for statusline/tmux integration
/// Format: "CC: 15.6K/44.0K | 2h 51m left | 103.2 tok/min"
pub(crate) fn print_statusline(metrics: Option<&SessionMetrics>, plan: &PlanConfig) {
    let Some(metrics) = metrics else {
        println!("CC: no active session");
        return;
    };

    let mut parts = vec![match plan.token_limit {
        Some(limit) => format!(
            "CC: {}/{}",
            format_compact(metrics.total_tokens),
            format_compact(limit)
        ),
        None => format!("CC: {}", format_compact(metrics.total_tokens)),
    }];
    parts.push(format!("{} left", format_duration(metrics.time_remaining)));
    if metrics.burn_rate > 0.0 {
        parts.push(format_rate(metrics.burn_rate));
    }
    if let Some(eta) = metrics.estimated_time_to_limit {
        parts.push(format!("limit in {}", format_duration(eta)));
    }
    println!("{}", parts.join(" | "));
}

/// Statusline as JSON for programmatic consumption
pub(crate) fn output_statusline_json(
    metrics: Option<&SessionMetrics>,
    plan: &PlanConfig,
) -> String {
    let output = match metrics {
        Some(m) => serde_json::json!({
            "active": true,
            "plan": plan.plan_name,
            "token_limit": plan.token_limit,
            "total_tokens": m.total_tokens,
            "time_remaining_seconds": m.time_remaining.num_seconds(),
            "burn_rate_per_min": m.burn_rate,
            "estimated_seconds_to_limit": m.estimated_time_to_limit.map(|d| d.num_seconds()),
        }),
        None => serde_json::json!({
            "active": false,
            "plan": plan.plan_name,
            "token_limit": plan.token_limit,
        }),
    };

    serde_json::to_string(&output).unwrap_or_else(|e| {
        eprintln!("Failed to serialize JSON output: {e}");
        "{}".to_string()
    })
}
