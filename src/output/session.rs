use comfy_table::{
    Color, ContentArrangement, Table, modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::core::{ExtractStats, PlanConfig, SessionMetrics};
use crate::output::format::{
    format_compact, format_duration, format_local, format_number, format_rate, header_cell,
    right_cell,
};
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionTableOptions {
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) timezone: Timezone,
}

/// Color for the quota-usage cell based on how much of the ceiling is gone
fn usage_color(total: u64, limit: Option<u64>, use_color: bool) -> Option<Color> {
    if !use_color {
        return None;
    }
    let limit = limit?;
    if limit == 0 {
        return Some(Color::Red);
    }
    let ratio = total as f64 / limit as f64;
    if ratio >= 0.9 {
        Some(Color::Red)
    } else if ratio >= 0.7 {
        Some(Color::Yellow)
    } else {
        Some(Color::Green)
    }
}

fn quota_label(metrics: &SessionMetrics, plan: &PlanConfig) -> String {
    match plan.token_limit {
        Some(limit) if limit > 0 => format!(
            "{} / {} ({:.0}%)",
            format_number(metrics.total_tokens),
            format_number(limit),
            metrics.total_tokens as f64 / limit as f64 * 100.0
        ),
        _ => format_number(metrics.total_tokens),
    }
}

pub(crate) fn print_session_table(
    metrics: &SessionMetrics,
    plan: &PlanConfig,
    opts: SessionTableOptions,
) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let use_color = opts.use_color;
    let quota_cell = right_cell(
        &quota_label(metrics, plan),
        usage_color(metrics.total_tokens, plan.token_limit, use_color),
        true,
    );

    let plan_label = match plan.token_limit {
        Some(limit) => format!("{} ({} token limit)", plan.plan_name, format_number(limit)),
        None => plan.plan_name.clone(),
    };

    if opts.compact {
        table.add_row(vec![header_cell("Plan", use_color), right_cell(&plan_label, None, false)]);
        table.add_row(vec![header_cell("Quota tokens", use_color), quota_cell]);
        table.add_row(vec![
            header_cell("Time remaining", use_color),
            right_cell(&format_duration(metrics.time_remaining), None, false),
        ]);
        table.add_row(vec![
            header_cell("Burn rate", use_color),
            right_cell(&format_rate(metrics.burn_rate), None, false),
        ]);
    } else {
        table.add_row(vec![header_cell("Plan", use_color), right_cell(&plan_label, None, false)]);
        table.add_row(vec![
            header_cell("Session started", use_color),
            right_cell(&format_local(metrics.start_time, opts.timezone), None, false),
        ]);
        table.add_row(vec![
            header_cell("Last event", use_color),
            right_cell(&format_local(metrics.last_event_time, opts.timezone), None, false),
        ]);
        table.add_row(vec![
            header_cell("Resets at", use_color),
            right_cell(&format_local(metrics.end_time, opts.timezone), None, false),
        ]);
        table.add_row(vec![
            header_cell("Time remaining", use_color),
            right_cell(&format_duration(metrics.time_remaining), None, false),
        ]);
        table.add_row(vec![
            header_cell("Input tokens", use_color),
            right_cell(&format_number(metrics.usage.input_tokens), None, false),
        ]);
        table.add_row(vec![
            header_cell("Output tokens", use_color),
            right_cell(&format_number(metrics.usage.output_tokens), None, false),
        ]);
        table.add_row(vec![
            header_cell("Cache creation", use_color),
            right_cell(&format_number(metrics.usage.cache_creation_tokens), None, false),
        ]);
        table.add_row(vec![
            header_cell("Cache read", use_color),
            right_cell(&format_number(metrics.usage.cache_read_tokens), None, false),
        ]);
        table.add_row(vec![header_cell("Quota tokens", use_color), quota_cell]);
        table.add_row(vec![
            header_cell("Events", use_color),
            right_cell(&format_number(metrics.event_count as u64), None, false),
        ]);
        table.add_row(vec![
            header_cell("Burn rate", use_color),
            right_cell(&format_rate(metrics.burn_rate), None, false),
        ]);
    }

    if let Some(eta) = metrics.estimated_time_to_limit {
        table.add_row(vec![
            header_cell("Limit reached in", use_color),
            right_cell(
                &format_duration(eta),
                if use_color { Some(Color::Red) } else { None },
                false,
            ),
        ]);
    }

    println!("\n  Active Session Window\n");
    println!("{table}");
    println!(
        "\n  {} tokens counted toward the limit ({} with cache)\n",
        format_compact(metrics.total_tokens),
        format_compact(
            metrics.total_tokens
                + metrics.usage.cache_creation_tokens
                + metrics.usage.cache_read_tokens
        )
    );
}

/// JSON for the `current` view. `session` is null when no window contains
/// the query instant; consumers branch on `active`, never on zeroed fields.
pub(crate) fn output_session_json(
    metrics: Option<&SessionMetrics>,
    plan: &PlanConfig,
    stats: &ExtractStats,
) -> String {
    let session = metrics.map(|m| {
        serde_json::json!({
            "start_time": m.start_time.to_rfc3339(),
            "last_event_time": m.last_event_time.to_rfc3339(),
            "end_time": m.end_time.to_rfc3339(),
            "input_tokens": m.usage.input_tokens,
            "output_tokens": m.usage.output_tokens,
            "cache_creation_tokens": m.usage.cache_creation_tokens,
            "cache_read_tokens": m.usage.cache_read_tokens,
            "total_tokens": m.total_tokens,
            "event_count": m.event_count,
            "time_remaining_seconds": m.time_remaining.num_seconds(),
            "is_active": m.is_active,
            "burn_rate_per_min": m.burn_rate,
            "estimated_seconds_to_limit": m.estimated_time_to_limit.map(|d| d.num_seconds()),
        })
    });

    let output = serde_json::json!({
        "plan": {
            "name": plan.plan_name,
            "token_limit": plan.token_limit,
        },
        "active": metrics.is_some(),
        "session": session,
        "diagnostics": {
            "lines": stats.lines,
            "events": stats.events,
            "skipped": stats.skipped,
            "synthesized_ids": stats.synthesized_ids,
        },
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        eprintln!("Failed to serialize JSON output: {e}");
        "{}".to_string()
    })
}
