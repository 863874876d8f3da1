//! Metrics: entity-scoped, fallible numeric results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::AnalyzerError;

/// The scope a metric describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Dataset,
    Column,
    MultiColumn,
}

impl Entity {
    /// `Column` for a single column, `MultiColumn` otherwise.
    pub fn for_columns(columns: &[String]) -> Self {
        if columns.len() == 1 {
            Self::Column
        } else {
            Self::MultiColumn
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dataset => "DATASET",
            Self::Column => "COLUMN",
            Self::MultiColumn => "MULTICOLUMN",
        };
        f.write_str(name)
    }
}

/// The outcome of one analyzer: either a value or the reason there is none.
///
/// `instance` names the target: a column, a comma-joined column list, or `*`
/// for dataset-level metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub entity: Entity,
    pub name: String,
    pub instance: String,
    pub value: Result<f64, AnalyzerError>,
}

impl Metric {
    pub fn success(entity: Entity, name: &str, instance: &str, value: f64) -> Self {
        Self {
            entity,
            name: name.to_string(),
            instance: instance.to_string(),
            value: Ok(value),
        }
    }

    pub fn failure(entity: Entity, name: &str, instance: &str, error: AnalyzerError) -> Self {
        Self {
            entity,
            name: name.to_string(),
            instance: instance.to_string(),
            value: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value.is_ok()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Ok(v) => write!(f, "{}({}, {}) = {v}", self.name, self.entity, self.instance),
            Err(e) => write!(f, "{}({}, {}) failed: {e}", self.name, self.entity, self.instance),
        }
    }
}

/// Serializable view of a metric, used for reports.
///
/// `parameters` and `filter` are only known when the record is built from an
/// analyzer context; they tell apart metrics such as two quantiles of the same
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity: Entity,
    pub name: String,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Metric> for MetricRecord {
    fn from(metric: &Metric) -> Self {
        let (value, error) = match &metric.value {
            Ok(v) => (Some(*v), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            entity: metric.entity,
            name: metric.name.clone(),
            instance: metric.instance.clone(),
            parameters: None,
            filter: None,
            value,
            error,
        }
    }
}
