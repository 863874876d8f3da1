//! Mean analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, MeanState, Precondition, ScanShareableAnalyzer,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Arithmetic mean of the non-null values of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mean {
    column: String,
    filter: Option<String>,
}

numeric_column_definition!(Mean, "Mean");

impl ScanShareableAnalyzer for Mean {
    type State = MeanState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new()
            .with(&self.column, AggregationFunction::Sum)
            .with(&self.column, AggregationFunction::CountNumeric)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<MeanState>> {
        let total = result.get(&AggregationFunction::Sum, &self.column)?;
        let count = result
            .get(&AggregationFunction::CountNumeric, &self.column)?
            .unwrap_or(0.0) as u64;
        Ok(match total {
            Some(total) if count > 0 => Some(MeanState { total, count }),
            _ => None,
        })
    }
}
