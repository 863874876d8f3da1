//! Sum analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, Precondition, ScanShareableAnalyzer, SumState,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Sum of the non-null values of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sum {
    column: String,
    filter: Option<String>,
}

numeric_column_definition!(Sum, "Sum");

impl ScanShareableAnalyzer for Sum {
    type State = SumState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new().with(&self.column, AggregationFunction::Sum)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<SumState>> {
        let sum = result.get(&AggregationFunction::Sum, &self.column)?;
        Ok(sum.map(|sum_value| SumState { sum_value }))
    }
}
