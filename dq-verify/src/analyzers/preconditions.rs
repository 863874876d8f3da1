//! Validation run against a dataset's schema before any computation.

use std::fmt;

use super::errors::{AnalyzerError, AnalyzerResult};
use crate::data::Dataset;

/// A schema-level requirement an analyzer places on its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Precondition {
    /// The column must exist.
    HasColumn(String),
    /// The column must exist and hold a numeric type.
    IsNumeric(String),
    /// The column must exist and hold a string type.
    IsString(String),
    /// At least one column must be given.
    AtLeastOne(Vec<String>),
}

impl Precondition {
    pub fn has_column(column: impl Into<String>) -> Self {
        Self::HasColumn(column.into())
    }

    pub fn is_numeric(column: impl Into<String>) -> Self {
        Self::IsNumeric(column.into())
    }

    pub fn is_string(column: impl Into<String>) -> Self {
        Self::IsString(column.into())
    }

    pub fn check(&self, data: &dyn Dataset) -> AnalyzerResult<()> {
        match self {
            Self::HasColumn(column) => require_column(data, column),
            Self::IsNumeric(column) => require_type(data, column, "numeric", data.is_numeric(column)),
            Self::IsString(column) => require_type(data, column, "string", data.is_string(column)),
            Self::AtLeastOne(columns) => {
                if columns.is_empty() {
                    Err(AnalyzerError::NoColumnsSpecified)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasColumn(c) => write!(f, "has_column({c})"),
            Self::IsNumeric(c) => write!(f, "is_numeric({c})"),
            Self::IsString(c) => write!(f, "is_string({c})"),
            Self::AtLeastOne(cs) => write!(f, "at_least_one([{}])", cs.join(", ")),
        }
    }
}

fn require_column(data: &dyn Dataset, column: &str) -> AnalyzerResult<()> {
    if data.has_column(column) {
        Ok(())
    } else {
        Err(AnalyzerError::missing_column(column))
    }
}

fn require_type(data: &dyn Dataset, column: &str, expected: &str, ok: bool) -> AnalyzerResult<()> {
    require_column(data, column)?;
    if ok {
        return Ok(());
    }
    let found = data
        .column_type(column)
        .map(|t| t.to_string())
        .unwrap_or_default();
    Err(AnalyzerError::WrongType {
        column: column.to_string(),
        expected: expected.to_string(),
        found,
    })
}

/// Returns the first violated precondition, in declaration order.
pub fn find_first_failing(data: &dyn Dataset, preconditions: &[Precondition]) -> Option<AnalyzerError> {
    preconditions.iter().find_map(|p| p.check(data).err())
}
