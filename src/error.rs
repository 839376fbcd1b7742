//! Error types for test-selector
//!
//! Every fatal condition in the fetch → parse → select pipeline maps to one
//! `AppError` variant. `SelectionFailure` wraps an `AppError` together with
//! the untouched candidate count so callers can fall back to running
//! everything.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    /// The object store could not be reached or authentication failed.
    #[error("Connection to object storage failed: {reason}")]
    Connection { reason: String },

    #[error("Object {object} not found in bucket {bucket}")]
    ObjectNotFound { bucket: String, object: String },

    /// The object exists (or might) but the store refused to open it.
    #[error("Failed to get the object {object} in bucket {bucket}: HTTP {status}")]
    Fetch {
        bucket: String,
        object: String,
        status: u16,
    },

    #[error("Failed to read object {object}: {source}")]
    Read {
        object: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Malformed statistics data at line {line}: {reason}")]
    StatisticsParse { line: u64, reason: String },

    #[error("Operation cancelled by caller")]
    Cancelled,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid candidate list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AppError {
    /// Stable, low-cardinality label for this error, used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => "config",
            Self::Connection { .. } => "connection",
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::Fetch { .. } => "fetch",
            Self::Read { .. } => "read",
            Self::StatisticsParse { .. } => "statistics_parse",
            Self::Cancelled => "cancelled",
            Self::Io { .. } => "io",
            Self::Json(_) => "json",
            Self::Metrics(_) => "metrics",
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

/// A selection run that aborted before any candidate was modified
///
/// `fallback_count` is the full candidate count: with selection unavailable,
/// every candidate is still runnable.
#[derive(Error, Debug)]
#[error("Test selection for suite {suite} on {cloud} failed: {source}")]
pub struct SelectionFailure {
    pub suite: String,
    pub cloud: String,
    pub fallback_count: usize,
    #[source]
    pub source: AppError,
}

impl SelectionFailure {
    /// Consume the failure and return the underlying error
    pub fn into_inner(self) -> AppError {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_creates() {
        let err = AppError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_object_not_found_names_bucket_and_object() {
        let err = AppError::ObjectNotFound {
            bucket: "stats".to_string(),
            object: "tests-nightly-gce.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Object tests-nightly-gce.csv not found in bucket stats"
        );
    }

    #[test]
    fn test_statistics_parse_error_names_line() {
        let err = AppError::StatisticsParse {
            line: 3,
            reason: "expected 4 fields, found 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed statistics data at line 3: expected 4 fields, found 3"
        );
    }

    #[test]
    fn test_kind_labels_are_stable() {
        assert_eq!(AppError::Cancelled.kind(), "cancelled");
        assert_eq!(
            AppError::Connection {
                reason: "x".to_string()
            }
            .kind(),
            "connection"
        );
        assert_eq!(
            AppError::Fetch {
                bucket: "b".to_string(),
                object: "o".to_string(),
                status: 403,
            }
            .kind(),
            "fetch"
        );
    }

    #[test]
    fn test_selection_failure_preserves_source_chain() {
        let failure = SelectionFailure {
            suite: "nightly".to_string(),
            cloud: "gce".to_string(),
            fallback_count: 7,
            source: AppError::Cancelled,
        };

        assert_eq!(
            failure.to_string(),
            "Test selection for suite nightly on gce failed: Operation cancelled by caller"
        );
        let source = failure.source().expect("should expose source");
        assert_eq!(source.to_string(), "Operation cancelled by caller");
        assert!(matches!(failure.into_inner(), AppError::Cancelled));
    }
}
