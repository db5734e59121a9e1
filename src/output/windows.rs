use chrono::{DateTime, Utc};
use comfy_table::{
    Cell, Color, ContentArrangement, Table, modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::core::{SessionWindow, TokenUsage};
use crate::output::format::{
    format_compact, format_local, format_number, header_cell, right_cell, styled_cell,
};
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowTableOptions {
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) timezone: Timezone,
}

pub(crate) fn print_windows_table(
    windows: &[SessionWindow],
    now: DateTime<Utc>,
    opts: WindowTableOptions,
) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let use_color = opts.use_color;

    if opts.compact {
        table.set_header(vec![
            header_cell("Window", use_color),
            header_cell("Events", use_color),
            header_cell("Total", use_color),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Window", use_color),
            header_cell("Last event", use_color),
            header_cell("Events", use_color),
            header_cell("Input", use_color),
            header_cell("Output", use_color),
            header_cell("Cache Create", use_color),
            header_cell("Cache Read", use_color),
            header_cell("Total", use_color),
        ]);
    }

    let active_color = if use_color { Some(Color::Green) } else { None };
    let mut totals = TokenUsage::default();
    let mut total_events: u64 = 0;

    for window in windows {
        let totals_for_window = window.totals();
        totals.add(&totals_for_window);
        total_events += window.events.len() as u64;

        let is_active = window.contains(now);
        let label = format!(
            "{} - {}{}",
            format_local(window.start_time, opts.timezone),
            format_local(window.end_time, opts.timezone),
            if is_active { " *" } else { "" }
        );
        let label_cell = if is_active {
            styled_cell(&label, active_color, true)
        } else {
            Cell::new(&label)
        };

        if opts.compact {
            table.add_row(vec![
                label_cell,
                right_cell(&format_number(window.events.len() as u64), None, false),
                right_cell(&format_compact(totals_for_window.quota_tokens()), None, false),
            ]);
        } else {
            table.add_row(vec![
                label_cell,
                Cell::new(format_local(window.last_event_time, opts.timezone)),
                right_cell(&format_number(window.events.len() as u64), None, false),
                right_cell(&format_number(totals_for_window.input_tokens), None, false),
                right_cell(&format_number(totals_for_window.output_tokens), None, false),
                right_cell(&format_number(totals_for_window.cache_creation_tokens), None, false),
                right_cell(&format_number(totals_for_window.cache_read_tokens), None, false),
                right_cell(&format_number(totals_for_window.quota_tokens()), None, false),
            ]);
        }
    }

    let cyan = if use_color { Some(Color::Cyan) } else { None };
    if opts.compact {
        table.add_row(vec![
            styled_cell("TOTAL", cyan, true),
            right_cell(&format_number(total_events), cyan, false),
            right_cell(&format_compact(totals.quota_tokens()), cyan, false),
        ]);
    } else {
        table.add_row(vec![
            styled_cell("TOTAL", cyan, true),
            Cell::new(""),
            right_cell(&format_number(total_events), cyan, false),
            right_cell(&format_number(totals.input_tokens), cyan, false),
            right_cell(&format_number(totals.output_tokens), cyan, false),
            right_cell(&format_number(totals.cache_creation_tokens), cyan, false),
            right_cell(&format_number(totals.cache_read_tokens), cyan, false),
            right_cell(&format_number(totals.quota_tokens()), cyan, false),
        ]);
    }

    println!("\n  Session Windows (today, * = active)\n");
    println!("{table}");
    println!("\n  {} windows\n", windows.len());
}

pub(crate) fn output_windows_json(windows: &[SessionWindow], now: DateTime<Utc>) -> String {
    let output: Vec<serde_json::Value> = windows
        .iter()
        .map(|window| {
            let totals = window.totals();
            serde_json::json!({
                "start_time": window.start_time.to_rfc3339(),
                "end_time": window.end_time.to_rfc3339(),
                "last_event_time": window.last_event_time.to_rfc3339(),
                "event_count": window.events.len(),
                "input_tokens": totals.input_tokens,
                "output_tokens": totals.output_tokens,
                "cache_creation_tokens": totals.cache_creation_tokens,
                "cache_read_tokens": totals.cache_read_tokens,
                "total_tokens": totals.quota_tokens(),
                "is_active": window.contains(now),
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        eprintln!("Failed to serialize JSON output: {e}");
        "[]".to_string()
    })
}
