//! Unified error types for epss-tools.
//!
//! Transport failures are retryable (and are retried internally with
//! backoff); format failures are not. "Not found" is only an error for
//! single-identifier convenience lookups — batch and list calls report
//! misses as absent records.

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for epss-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EpssError {
    /// The remote feed could not be reached or answered with an error status
    #[error("EPSS request failed: {context}")]
    Transport {
        context: String,
        #[source]
        source: TransportErrorKind,
    },

    /// The feed answered, but the payload could not be decoded
    #[error("Failed to decode EPSS response: {context}")]
    Format {
        context: String,
        #[source]
        source: FormatErrorKind,
    },

    /// No score data for a single-identifier lookup
    #[error("No EPSS data for {cve_id}{}", date_suffix(.date))]
    NotFound {
        cve_id: String,
        date: Option<NaiveDate>,
    },

    /// Caller-supplied arguments were rejected before any request was made
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn date_suffix(date: &Option<NaiveDate>) -> String {
    date.map(|d| format!(" on {d}")).unwrap_or_default()
}

/// Specific transport error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportErrorKind {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Feed returned HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Feed reported error status '{status}' (code {code})")]
    FeedStatus { status: String, code: u16 },
}

/// Specific format error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormatErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Score out of range for {cve_id}: {field}={value} (expected 0.0-1.0)")]
    ScoreOutOfRange {
        cve_id: String,
        field: String,
        value: f64,
    },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Serialization to {format} failed: {message}")]
    Serialize { format: String, message: String },
}

impl EpssError {
    /// Build a transport error with context.
    pub fn transport(context: impl Into<String>, source: TransportErrorKind) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    /// Build a format error with context.
    pub fn format(context: impl Into<String>, source: FormatErrorKind) -> Self {
        Self::Format {
            context: context.into(),
            source,
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Convenient Result type for epss-tools operations
pub type Result<T> = std::result::Result<T, EpssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_includes_date() {
        let err = EpssError::NotFound {
            cve_id: "CVE-2022-26332".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 11, 24),
        };
        assert_eq!(
            err.to_string(),
            "No EPSS data for CVE-2022-26332 on 2023-11-24"
        );

        let err = EpssError::NotFound {
            cve_id: "CVE-2022-26332".to_string(),
            date: None,
        };
        assert_eq!(err.to_string(), "No EPSS data for CVE-2022-26332");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        let transport = EpssError::transport(
            "lookup",
            TransportErrorKind::Timeout,
        );
        assert!(transport.is_retryable());

        let format = EpssError::format(
            "lookup",
            FormatErrorKind::InvalidJson("unexpected EOF".to_string()),
        );
        assert!(!format.is_retryable());
        assert!(!EpssError::Validation("empty id list".to_string()).is_retryable());
    }
}
