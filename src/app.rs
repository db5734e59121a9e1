//! Command dispatch
//!
//! Resolves the evaluation instant, plan, and engine parameters from the
//! CLI, gathers the event batch, and renders each view. The engine stays
//! pure; every clock read happens here.

use std::io::BufRead;

use chrono::{DateTime, Duration, Utc};

use crate::cli::{Cli, Commands};
use crate::core::{
    EngineParams, ExtractStats, PlanConfig, SessionMetrics, UsageEvent, compute_from_events,
    compute_session_metrics, compute_windows, extract_batch,
};
use crate::error::AppError;
use crate::output::{
    SessionTableOptions, WindowTableOptions, output_session_json, output_statusline_json,
    output_windows_json, print_session_table, print_statusline, print_windows_table,
};
use crate::source::load_events;
use crate::utils::{Timezone, set_parse_debug};

/// The instant metrics are evaluated at: `--at` when given, else the wall
/// clock. The only clock read in the program.
fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>, AppError> {
    match at {
        Some(raw) => raw
            .parse::<DateTime<Utc>>()
            .map_err(|_| AppError::InvalidInstant {
                input: raw.to_string(),
            }),
        None => Ok(Utc::now()),
    }
}

fn read_stdin_lines() -> Vec<String> {
    std::io::stdin()
        .lock()
        .lines()
        .map_while(Result::ok)
        .collect()
}

fn session_metrics(
    cli: &Cli,
    quiet: bool,
    now: DateTime<Utc>,
    plan: &PlanConfig,
    params: &EngineParams,
) -> (Option<SessionMetrics>, ExtractStats) {
    if cli.stdin {
        let lines = read_stdin_lines();
        compute_session_metrics(lines.iter().map(String::as_str), now, plan, params)
    } else {
        let (events, stats) = load_events(quiet);
        (compute_from_events(events, now, plan, params), stats)
    }
}

fn gather_events(cli: &Cli, quiet: bool) -> (Vec<UsageEvent>, ExtractStats) {
    if cli.stdin {
        let lines = read_stdin_lines();
        extract_batch(lines.iter().map(String::as_str))
    } else {
        load_events(quiet)
    }
}

pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    let command = cli.command.unwrap_or(Commands::Current);
    let quiet = command.is_statusline();

    if cli.debug {
        set_parse_debug(true);
    }

    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    let now = resolve_now(cli.at.as_deref())?;
    let plan = cli.plan_config()?;
    let params = EngineParams {
        window_duration: Duration::hours(cli.session_hours),
        burn_window: Duration::minutes(cli.burn_minutes),
        timezone,
    };

    match command {
        Commands::Current => {
            let (metrics, stats) = session_metrics(cli, quiet, now, &plan, &params);
            if cli.json {
                println!("{}", output_session_json(metrics.as_ref(), &plan, &stats));
            } else {
                match metrics {
                    Some(metrics) => print_session_table(
                        &metrics,
                        &plan,
                        SessionTableOptions {
                            use_color: cli.use_color(),
                            compact: cli.compact,
                            timezone,
                        },
                    ),
                    None => println!("No active session."),
                }
            }
        }
        Commands::Windows => {
            let (events, _stats) = gather_events(cli, quiet);
            let windows = compute_windows(events, now, &params);
            if cli.json {
                println!("{}", output_windows_json(&windows, now));
            } else if windows.is_empty() {
                println!("No session windows today.");
            } else {
                print_windows_table(
                    &windows,
                    now,
                    WindowTableOptions {
                        use_color: cli.use_color(),
                        compact: cli.compact,
                        timezone,
                    },
                );
            }
        }
        Commands::Statusline => {
            let (metrics, _stats) = session_metrics(cli, quiet, now, &plan, &params);
            if cli.json {
                println!("{}", output_statusline_json(metrics.as_ref(), &plan));
            } else {
                print_statusline(metrics.as_ref(), &plan);
            }
        }
    }

    Ok(())
}
