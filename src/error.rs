use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid instant \"{input}\" (expected RFC 3339, e.g. 2026-02-06T10:00:00Z)")]
    InvalidInstant { input: String },

    #[error("Plan \"custom\" requires --limit")]
    MissingLimit,
}
