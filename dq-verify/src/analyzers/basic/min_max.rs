//! Minimum and maximum analyzers.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, MaxState, MinState, Precondition, ScanShareableAnalyzer,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Smallest non-null value of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimum {
    column: String,
    filter: Option<String>,
}

numeric_column_definition!(Minimum, "Minimum");

impl ScanShareableAnalyzer for Minimum {
    type State = MinState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new().with(&self.column, AggregationFunction::Min)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<MinState>> {
        let min = result.get(&AggregationFunction::Min, &self.column)?;
        Ok(min.map(|min_value| MinState { min_value }))
    }
}

/// Largest non-null value of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maximum {
    column: String,
    filter: Option<String>,
}

numeric_column_definition!(Maximum, "Maximum");

impl ScanShareableAnalyzer for Maximum {
    type State = MaxState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new().with(&self.column, AggregationFunction::Max)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<MaxState>> {
        let max = result.get(&AggregationFunction::Max, &self.column)?;
        Ok(max.map(|max_value| MaxState { max_value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{Analyzer, AnalyzerError};
    use crate::test_fixtures::{missing_dataset, numbers_dataset, numeric_dataset};

    #[tokio::test]
    async fn test_min_max() {
        let data = numeric_dataset().await;
        assert_eq!(Analyzer::from(Minimum::new("att1")).calculate(&data).await.value, Ok(1.0));
        assert_eq!(Analyzer::from(Maximum::new("att1")).calculate(&data).await.value, Ok(6.0));
    }

    #[tokio::test]
    async fn test_min_max_with_filter() {
        let data = numeric_dataset().await;
        let filter = Some("item != '6'".to_string());
        let max = Maximum::new("att1").with_filter(filter.clone());
        let min = Minimum::new("att1").with_filter(filter);
        assert_eq!(Analyzer::from(max).calculate(&data).await.value, Ok(5.0));
        assert_eq!(Analyzer::from(min).calculate(&data).await.value, Ok(1.0));
    }

    #[tokio::test]
    async fn test_non_numeric_column_fails() {
        let data = missing_dataset().await;
        let metric = Analyzer::from(Minimum::new("att1")).calculate(&data).await;
        assert!(matches!(metric.value, Err(AnalyzerError::WrongType { .. })));
    }

    #[tokio::test]
    async fn test_all_null_column_is_empty_state() {
        let data = numbers_dataset(&[None, None]).await;
        let metric = Analyzer::from(Maximum::new("value")).calculate(&data).await;
        assert!(matches!(metric.value, Err(AnalyzerError::EmptyState { .. })));
    }
}
