//! Grouping analyzers, computed from value frequencies.

use crate::analyzers::{AnalyzerDefinition, FrequenciesAndNumRows, GroupingAnalyzer, Precondition};
use crate::metrics::Entity;

/// Fraction of rows whose key occurs exactly once.
///
/// Rows where every grouping column is null are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniqueness {
    columns: Vec<String>,
    filter: Option<String>,
}

impl Uniqueness {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

impl AnalyzerDefinition for Uniqueness {
    fn name(&self) -> &'static str {
        "Uniqueness"
    }

    fn instance(&self) -> String {
        self.columns.join(",")
    }

    fn entity(&self) -> Entity {
        Entity::for_columns(&self.columns)
    }

    fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn preconditions(&self) -> Vec<Precondition> {
        std::iter::once(Precondition::AtLeastOne(self.columns.clone()))
            .chain(self.columns.iter().map(|c| Precondition::has_column(c)))
            .collect()
    }
}

impl GroupingAnalyzer for Uniqueness {
    fn grouping_columns(&self) -> &[String] {
        &self.columns
    }

    fn metric_from_frequencies(&self, state: &FrequenciesAndNumRows) -> f64 {
        state.unique_values() as f64 / state.num_rows as f64
    }
}
