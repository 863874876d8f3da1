//! Error types for the dq-verify library.
//!
//! Failures that happen while computing metrics are never raised: they live
//! inside [`Metric`](crate::metrics::Metric) values as
//! [`AnalyzerError`](crate::analyzers::AnalyzerError). The errors in this module
//! are the ones a caller can actually receive, which are construction-time
//! mistakes and failures while preparing a data source.

use thiserror::Error;

/// The main error type for the dq-verify library.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration or invalid builder arguments.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error when a required table is not registered.
    #[error("Table '{table}' is not registered in the session")]
    TableNotFound { table: String },
}

impl VerifyError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<serde_json::Error> for VerifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A type alias for `Result<T, VerifyError>`.
pub type Result<T> = std::result::Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = VerifyError::configuration("allowed values must not be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: allowed values must not be empty"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let err: VerifyError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, VerifyError::Serialization(_)));
    }
}
