//! Check severity levels and statuses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a check.
///
/// A failing check reports a status equal to its level, so a `Warning` check
/// can never produce an error status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Warning,
    #[default]
    Error,
}

impl CheckLevel {
    /// Returns the string representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckLevel::Warning => "warning",
            CheckLevel::Error => "error",
        }
    }
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a check or of a whole verification run.
///
/// Statuses are totally ordered: `Success < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[default]
    Success,
    Warning,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Success => "success",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
        }
    }
}

impl From<CheckLevel> for CheckStatus {
    fn from(level: CheckLevel) -> Self {
        match level {
            CheckLevel::Warning => CheckStatus::Warning,
            CheckLevel::Error => CheckStatus::Error,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
