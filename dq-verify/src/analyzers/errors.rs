//! Error types for the analyzer framework.
//!
//! These errors are stored inside metrics rather than propagated, so they are
//! cloneable and carry rendered messages instead of source errors.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur while validating or computing an analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// A precondition referenced a column the dataset does not have.
    #[error("Input data does not include column {column}!")]
    MissingColumn { column: String },

    /// A column has the wrong data type for the analyzer.
    #[error("Expected type of column {column} to be one of {expected} but found {found} instead!")]
    WrongType {
        column: String,
        expected: String,
        found: String,
    },

    /// A grouping analyzer was declared without columns.
    #[error("At least one column needs to be specified!")]
    NoColumnsSpecified,

    /// The state could not be computed because no non-null values exist.
    #[error("Empty state for analyzer {analyzer}, all input values were NULL.")]
    EmptyState { analyzer: String },

    /// Quantile outside of the unit interval.
    #[error("Quantile must be in the interval [0, 1], got {0}")]
    InvalidQuantile(f64),

    /// A regex pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// DataFusion query planning or execution error.
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(String),

    /// Data shape or type mismatch in a query result.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AnalyzerError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn empty_state(analyzer: impl Into<String>) -> Self {
        Self::EmptyState {
            analyzer: analyzer.into(),
        }
    }

    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Returns true for errors raised by precondition checks.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::WrongType { .. } | Self::NoColumnsSpecified
        )
    }
}

impl From<datafusion::error::DataFusionError> for AnalyzerError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        Self::QueryExecution(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for AnalyzerError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::ArrowComputation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            AnalyzerError::missing_column("att1").to_string(),
            "Input data does not include column att1!"
        );
        assert!(AnalyzerError::InvalidQuantile(1.1)
            .to_string()
            .contains("interval [0, 1]"));
        assert!(AnalyzerError::empty_state("Mean(att1)")
            .to_string()
            .starts_with("Empty state for analyzer Mean(att1)"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(AnalyzerError::NoColumnsSpecified.is_precondition_failure());
        assert!(!AnalyzerError::InvalidQuantile(2.0).is_precondition_failure());
    }
}
