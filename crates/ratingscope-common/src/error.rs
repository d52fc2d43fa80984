//! Error types and utilities for ratingscope

use thiserror::Error;

/// Result type alias for ratingscope operations
pub type Result<T> = std::result::Result<T, RatingsError>;

/// Main error type for ratingscope operations
#[derive(Error, Debug)]
pub enum RatingsError {
    /// Bad or missing filter definition, settings file, or dashboard page
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input CSV does not match the expected layout
    #[error("Data format error: {message}")]
    DataFormat {
        message: String,
        /// 1-based line in the input file, when known
        line: Option<u64>,
    },

    /// A requested month (or other item) is absent from the data
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Unsupported metric, plot type, or metric/filter combination
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        field: Option<String>,
    },

    /// Chart construction or serialization errors
    #[error("Chart error: {message}")]
    Chart {
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RatingsError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new data format error
    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat {
            message: msg.into(),
            line: None,
        }
    }

    /// Create a new data format error pinned to a line of the input
    pub fn data_format_at(msg: impl Into<String>, line: u64) -> Self {
        Self::DataFormat {
            message: format!("line {line}: {}", msg.into()),
            line: Some(line),
        }
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new invalid argument error for a named field or flag
    pub fn invalid_argument_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new chart error
    pub fn chart(msg: impl Into<String>) -> Self {
        Self::Chart {
            message: msg.into(),
        }
    }

    /// Short machine-friendly name of the error category.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::DataFormat { .. } | Self::Csv(_) => "data_format",
            Self::NotFound { .. } => "not_found",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Chart { .. } => "chart",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let config_error = RatingsError::config("missing bracket mapping");
        assert_eq!(
            config_error.to_string(),
            "Configuration error: missing bracket mapping"
        );

        let not_found = RatingsError::not_found("month 2030-01 not found");
        assert!(not_found.to_string().starts_with("Not found:"));

        let invalid = RatingsError::invalid_argument_field("unknown metric 'foo'", "metric");
        assert!(invalid.to_string().contains("unknown metric"));
        assert!(matches!(
            invalid,
            RatingsError::InvalidArgument { field: Some(ref f), .. } if f == "metric"
        ));
    }

    #[test]
    fn test_data_format_line() {
        let error = RatingsError::data_format_at("invalid number 'abc' in column reach_imp", 14);
        assert_eq!(
            error.to_string(),
            "Data format error: line 14: invalid number 'abc' in column reach_imp"
        );
        assert!(matches!(error, RatingsError::DataFormat { line: Some(14), .. }));
    }

    #[test]
    fn test_error_with_source() {
        let config_source_error = RatingsError::config_with_source(
            "failed to read filter",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );

        assert!(config_source_error.to_string().contains("failed to read filter"));
        assert!(config_source_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: RatingsError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert_eq!(error.kind(), "io");
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#)
            .unwrap_err();
        let error: RatingsError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(RatingsError::config("x").kind(), "config");
        assert_eq!(RatingsError::data_format("x").kind(), "data_format");
        assert_eq!(RatingsError::not_found("x").kind(), "not_found");
        assert_eq!(RatingsError::invalid_argument("x").kind(), "invalid_argument");
        assert_eq!(RatingsError::chart("x").kind(), "chart");
    }
}
