//! Usage record extraction
//!
//! Parses one JSONL log line into a normalized `UsageEvent`. All payload
//! shape variance (optional usage object, alternate id fields) is resolved
//! here, once; downstream components never re-check.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::consts::UNKNOWN;
use crate::core::types::{TokenUsage, UsageEvent};
use crate::utils::parse_debug_enabled;

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    record_type: Option<String>,
    timestamp: Option<String>,
    uuid: Option<String>,
    #[serde(rename = "requestId")]
    request_id: Option<String>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: Option<String>,
    role: Option<String>,
    usage: Option<RawUsage>,
}

#[derive(Debug, Deserialize, Default)]
struct RawUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

/// Per-batch extraction counters
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ExtractStats {
    /// Non-empty lines seen
    pub(crate) lines: u64,
    /// Lines that produced a usage event
    pub(crate) events: u64,
    /// Lines skipped: malformed, non-message, or missing usage/timestamp
    pub(crate) skipped: u64,
    /// Events that had no usable id and received a composite fallback key
    pub(crate) synthesized_ids: u64,
}

impl ExtractStats {
    pub(crate) fn add(&mut self, other: &ExtractStats) {
        self.lines += other.lines;
        self.events += other.events;
        self.skipped += other.skipped;
        self.synthesized_ids += other.synthesized_ids;
    }
}

/// Extract a usage event from one log line.
///
/// Skips are non-fatal: blank lines, unparseable JSON, non-message records
/// (summaries), records without a nested usage payload, and records with a
/// missing or unparseable timestamp all return `None` and parsing of the
/// batch continues.
pub(crate) fn extract_line(line: &str, stats: &mut ExtractStats) -> Option<UsageEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    stats.lines += 1;

    let record: RawRecord = match serde_json::from_str(trimmed) {
        Ok(record) => record,
        Err(err) => {
            stats.skipped += 1;
            if parse_debug_enabled() {
                eprintln!("Skipping malformed line: {err}");
            }
            return None;
        }
    };

    // Summaries carry no usage payload by construction.
    if record.record_type.as_deref() == Some("summary") {
        stats.skipped += 1;
        return None;
    }

    let Some(message) = record.message else {
        stats.skipped += 1;
        return None;
    };
    let Some(raw_usage) = message.usage else {
        stats.skipped += 1;
        return None;
    };

    let Some(ts) = record.timestamp else {
        stats.skipped += 1;
        return None;
    };
    let timestamp = match ts.parse::<DateTime<Utc>>() {
        Ok(dt) => dt,
        Err(err) => {
            stats.skipped += 1;
            if parse_debug_enabled() {
                eprintln!("Skipping line with invalid timestamp {ts}: {err}");
            }
            return None;
        }
    };

    let role = message.role.unwrap_or_else(|| UNKNOWN.to_string());
    let usage = TokenUsage {
        input_tokens: raw_usage.input_tokens.unwrap_or(0),
        output_tokens: raw_usage.output_tokens.unwrap_or(0),
        cache_creation_tokens: raw_usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read_tokens: raw_usage.cache_read_input_tokens.unwrap_or(0),
    };

    let id = match message.id.or(record.request_id).or(record.uuid) {
        Some(id) => id,
        None => {
            stats.synthesized_ids += 1;
            composite_id(timestamp, &role, &usage)
        }
    };

    stats.events += 1;
    Some(UsageEvent {
        id,
        timestamp,
        role,
        usage,
    })
}

/// Fallback identity for records with no message, request, or record id.
/// Two genuinely distinct events with identical timestamp, role, and counts
/// collapse to one under this key; callers see the count in
/// `ExtractStats::synthesized_ids`.
fn composite_id(timestamp: DateTime<Utc>, role: &str, usage: &TokenUsage) -> String {
    format!(
        "ts:{}|{}|{}|{}|{}|{}",
        timestamp.timestamp_millis(),
        role,
        usage.input_tokens,
        usage.output_tokens,
        usage.cache_creation_tokens,
        usage.cache_read_tokens
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(line: &str) -> (Option<UsageEvent>, ExtractStats) {
        let mut stats = ExtractStats::default();
        let event = extract_line(line, &mut stats);
        (event, stats)
    }

    const FULL_LINE: &str = r#"{"type":"assistant","timestamp":"2026-02-06T10:00:00Z","uuid":"uuid-1","requestId":"req-1","message":{"id":"msg-1","role":"assistant","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":10,"cache_read_input_tokens":20}}}"#;

    #[test]
    fn extracts_full_record() {
        let (event, stats) = extract(FULL_LINE);
        let event = event.unwrap();
        assert_eq!(event.id, "msg-1");
        assert_eq!(event.role, "assistant");
        assert_eq!(
            event.timestamp,
            "2026-02-06T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(event.usage.input_tokens, 100);
        assert_eq!(event.usage.output_tokens, 50);
        assert_eq!(event.usage.cache_creation_tokens, 10);
        assert_eq!(event.usage.cache_read_tokens, 20);
        assert_eq!(stats.events, 1);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.synthesized_ids, 0);
    }

    #[test]
    fn blank_lines_are_ignored_without_counting() {
        let (event, stats) = extract("   ");
        assert!(event.is_none());
        assert_eq!(stats.lines, 0);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn malformed_json_is_skipped() {
        let (event, stats) = extract("{not json");
        assert!(event.is_none());
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn summary_records_are_skipped() {
        let line = r#"{"type":"summary","summary":"compact conversation","leafUuid":"x"}"#;
        let (event, stats) = extract(line);
        assert!(event.is_none());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn records_without_usage_are_skipped() {
        let line = r#"{"type":"user","timestamp":"2026-02-06T10:00:00Z","message":{"role":"user","content":"hi"}}"#;
        let (event, stats) = extract(line);
        assert!(event.is_none());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn missing_timestamp_is_skipped() {
        let line = r#"{"type":"assistant","message":{"id":"m","role":"assistant","usage":{"input_tokens":1}}}"#;
        let (event, stats) = extract(line);
        assert!(event.is_none());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn invalid_timestamp_is_skipped() {
        let line = r#"{"timestamp":"not-a-time","message":{"id":"m","usage":{"input_tokens":1}}}"#;
        let (event, stats) = extract(line);
        assert!(event.is_none());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn token_counts_default_to_zero() {
        let line = r#"{"timestamp":"2026-02-06T10:00:00Z","message":{"id":"m","usage":{"output_tokens":5}}}"#;
        let (event, _) = extract(line);
        let event = event.unwrap();
        assert_eq!(event.usage.input_tokens, 0);
        assert_eq!(event.usage.output_tokens, 5);
        assert_eq!(event.usage.cache_creation_tokens, 0);
        assert_eq!(event.usage.cache_read_tokens, 0);
    }

    #[test]
    fn missing_role_defaults_to_unknown() {
        let line = r#"{"timestamp":"2026-02-06T10:00:00Z","message":{"id":"m","usage":{}}}"#;
        let (event, _) = extract(line);
        assert_eq!(event.unwrap().role, "unknown");
    }

    #[test]
    fn id_falls_back_to_request_id_then_uuid() {
        let with_request = r#"{"timestamp":"2026-02-06T10:00:00Z","requestId":"req-9","uuid":"uuid-9","message":{"usage":{}}}"#;
        let (event, _) = extract(with_request);
        assert_eq!(event.unwrap().id, "req-9");

        let with_uuid = r#"{"timestamp":"2026-02-06T10:00:00Z","uuid":"uuid-9","message":{"usage":{}}}"#;
        let (event, _) = extract(with_uuid);
        assert_eq!(event.unwrap().id, "uuid-9");
    }

    #[test]
    fn missing_id_synthesizes_composite_key() {
        let line = r#"{"timestamp":"2026-02-06T10:00:00Z","message":{"role":"assistant","usage":{"input_tokens":10,"output_tokens":5}}}"#;
        let (event, stats) = extract(line);
        let event = event.unwrap();
        assert_eq!(stats.synthesized_ids, 1);
        assert!(event.id.starts_with("ts:"));

        // the same record in another file maps to the same key
        let (twin, _) = extract(line);
        assert_eq!(event.id, twin.unwrap().id);
    }

    #[test]
    fn composite_keys_differ_when_counts_differ() {
        let a = r#"{"timestamp":"2026-02-06T10:00:00Z","message":{"role":"assistant","usage":{"input_tokens":10}}}"#;
        let b = r#"{"timestamp":"2026-02-06T10:00:00Z","message":{"role":"assistant","usage":{"input_tokens":11}}}"#;
        let (ea, _) = extract(a);
        let (eb, _) = extract(b);
        assert_ne!(ea.unwrap().id, eb.unwrap().id);
    }

    #[test]
    fn stats_add_accumulates() {
        let mut total = ExtractStats::default();
        let mut partial = ExtractStats::default();
        extract_line(FULL_LINE, &mut partial);
        extract_line("{bad", &mut partial);
        total.add(&partial);
        total.add(&partial);
        assert_eq!(total.lines, 4);
        assert_eq!(total.events, 2);
        assert_eq!(total.skipped, 2);
    }
}
