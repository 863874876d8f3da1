//! Regular expression match analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, NumMatchesAndCount, Precondition, ScanShareableAnalyzer,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Fraction of rows whose string value contains a match for `pattern`.
///
/// Null values never match but still count towards the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    column: String,
    pattern: String,
    filter: Option<String>,
}

impl PatternMatch {
    pub fn new(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            pattern: pattern.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    fn function(&self) -> AggregationFunction {
        AggregationFunction::pattern_matches(&self.pattern)
    }
}

impl AnalyzerDefinition for PatternMatch {
    fn name(&self) -> &'static str {
        "PatternMatch"
    }

    fn instance(&self) -> String {
        self.column.clone()
    }

    fn entity(&self) -> Entity {
        Entity::Column
    }

    fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn parameters(&self) -> Option<String> {
        Some(self.pattern.clone())
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![
            Precondition::has_column(&self.column),
            Precondition::is_string(&self.column),
        ]
    }
}

impl ScanShareableAnalyzer for PatternMatch {
    type State = NumMatchesAndCount;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new()
            .with(&self.column, self.function())
            .with(&self.column, AggregationFunction::CountAll)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<NumMatchesAndCount>> {
        let num_matches = result.get(&self.function(), &self.column)?.unwrap_or(0.0);
        let count = result
            .get(&AggregationFunction::CountAll, &self.column)?
            .unwrap_or(0.0);
        Ok(Some(NumMatchesAndCount {
            num_matches: num_matches as u64,
            count: count as u64,
        }))
    }
}
