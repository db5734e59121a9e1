//! Parallel log loading
//!
//! Reads every discovered log file and extracts usage events. Files are
//! parsed in parallel; the flattened result keeps file order so downstream
//! deduplication stays deterministic.

use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::core::{ExtractStats, UsageEvent, extract_line};
use crate::source::find_log_files;
use crate::utils::parse_debug_enabled;

/// Load the union of usage events across all discovered log files.
pub(crate) fn load_events(quiet: bool) -> (Vec<UsageEvent>, ExtractStats) {
    let discovery_start = Instant::now();
    let files = find_log_files();
    let discovery_ms = discovery_start.elapsed().as_secs_f64() * 1000.0;

    if files.is_empty() {
        return (Vec::new(), ExtractStats::default());
    }

    if !quiet {
        eprintln!(
            "Scanning {} log files... ({:.2}ms)",
            files.len(),
            discovery_ms
        );
    }

    let parse_start = Instant::now();
    let per_file: Vec<(Vec<UsageEvent>, ExtractStats)> =
        files.par_iter().map(|path| parse_file(path)).collect();
    let parse_ms = parse_start.elapsed().as_secs_f64() * 1000.0;

    let mut events = Vec::new();
    let mut stats = ExtractStats::default();
    for (file_events, file_stats) in per_file {
        events.extend(file_events);
        stats.add(&file_stats);
    }

    if !quiet {
        eprintln!(
            "Extracted {} events from {} lines ({:.2}ms)",
            stats.events, stats.lines, parse_ms
        );
    }

    (events, stats)
}

/// Parse one log file. Unreadable files and unreadable lines are skipped;
/// the rest of the batch continues.
fn parse_file(path: &Path) -> (Vec<UsageEvent>, ExtractStats) {
    let mut events = Vec::new();
    let mut stats = ExtractStats::default();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            if parse_debug_enabled() {
                eprintln!("Failed to open {}: {}", path.display(), err);
            }
            return (events, stats);
        }
    };

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                if parse_debug_enabled() {
                    eprintln!(
                        "Failed to read line {} in {}: {}",
                        line_no + 1,
                        path.display(),
                        err
                    );
                }
                continue;
            }
        };
        if let Some(event) = extract_line(&line, &mut stats) {
            events.push(event);
        }
    }

    (events, stats)
}
