//! Log discovery and loading
//!
//! Finds Claude Code JSONL logs on disk and feeds their lines to the
//! extraction engine. All I/O lives here; per-file and per-line failures
//! are non-fatal.

pub(crate) mod loader;

pub(crate) use loader::load_events;

use std::path::PathBuf;

/// Claude Code data directories, in scan order.
///
/// `CLAUDE_CONFIG_DIR` overrides discovery entirely; it may hold a
/// comma-separated list of config directories, each expected to contain a
/// `projects/` tree.
fn data_dirs() -> Vec<PathBuf> {
    if let Ok(value) = std::env::var("CLAUDE_CONFIG_DIR") {
        return value
            .split(',')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(|dir| PathBuf::from(dir).join("projects"))
            .collect();
    }

    let mut dirs_found = Vec::new();
    if let Some(home) = dirs::home_dir() {
        dirs_found.push(home.join(".claude").join("projects"));
        dirs_found.push(home.join(".config").join("claude").join("projects"));
    }
    dirs_found
}

/// All JSONL log files across the data directories, sorted for a
/// deterministic scan order.
pub(crate) fn find_log_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in data_dirs() {
        if let Ok(entries) = glob::glob(&format!("{}/**/*.jsonl", dir.display())) {
            for entry in entries.flatten() {
                files.push(entry);
            }
        }
    }
    files.sort();
    files.dedup();
    files
}
