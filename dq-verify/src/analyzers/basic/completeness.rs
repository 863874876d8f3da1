//! Completeness analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, NumMatchesAndCount, Precondition, ScanShareableAnalyzer,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Fraction of non-null values in a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completeness {
    column: String,
    filter: Option<String>,
}

impl Completeness {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

impl AnalyzerDefinition for Completeness {
    fn name(&self) -> &'static str {
        "Completeness"
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

    fn preconditions(&self) -> Vec<Precondition> {
        vec![Precondition::has_column(&self.column)]
    }
}

impl ScanShareableAnalyzer for Completeness {
    type State = NumMatchesAndCount;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new()
            .with(&self.column, AggregationFunction::CountNonNull)
            .with(&self.column, AggregationFunction::CountAll)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<NumMatchesAndCount>> {
        let num_matches = result.get(&AggregationFunction::CountNonNull, &self.column)?;
        let count = result.get(&AggregationFunction::CountAll, &self.column)?;
        Ok(Some(NumMatchesAndCount {
            num_matches: num_matches.unwrap_or(0.0) as u64,
            count: count.unwrap_or(0.0) as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{Analyzer, AnalyzerError};
    use crate::test_fixtures::{missing_dataset, numeric_dataset};

    #[tokio::test]
    async fn test_completeness() {
        let data = missing_dataset().await;
        let att1 = Analyzer::from(Completeness::new("att1")).calculate(&data).await;
        let att2 = Analyzer::from(Completeness::new("att2")).calculate(&data).await;
        assert_eq!(att1.value, Ok(0.5));
        assert_eq!(att2.value, Ok(0.75));
    }

    #[tokio::test]
    async fn test_completeness_missing_column() {
        let data = missing_dataset().await;
        let metric = Analyzer::from(Completeness::new("some_missing_column"))
            .calculate(&data)
            .await;
        assert_eq!(
            metric.value,
            Err(AnalyzerError::missing_column("some_missing_column"))
        );
        assert!(metric
            .value
            .unwrap_err()
            .to_string()
            .contains("some_missing_column"));
    }

    #[tokio::test]
    async fn test_completeness_with_filter() {
        let data = missing_dataset().await;
        let completeness = Completeness::new("att1").with_filter(Some("item IN ('1', '2')".into()));
        let metric = Analyzer::from(completeness).calculate(&data).await;
        assert_eq!(metric.value, Ok(1.0));
    }

    #[tokio::test]
    async fn test_completeness_of_empty_view_is_nan() {
        let data = numeric_dataset().await;
        let completeness = Completeness::new("att1").with_filter(Some("att1 > 100".into()));
        let metric = Analyzer::from(completeness).calculate(&data).await;
        assert!(metric.value.is_ok_and(f64::is_nan));
    }
}
