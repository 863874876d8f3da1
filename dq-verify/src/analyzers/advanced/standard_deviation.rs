//! Population standard deviation analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, Precondition, ScanShareableAnalyzer,
    StandardDeviationState,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Population standard deviation (degrees of freedom = 0) of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardDeviation {
    column: String,
    filter: Option<String>,
}

numeric_column_definition!(StandardDeviation, "StandardDeviation");

impl ScanShareableAnalyzer for StandardDeviation {
    type State = StandardDeviationState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new()
            .with(&self.column, AggregationFunction::CountNumeric)
            .with(&self.column, AggregationFunction::Mean)
            .with(&self.column, AggregationFunction::PopulationVariance)
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<StandardDeviationState>> {
        let n = result
            .get(&AggregationFunction::CountNumeric, &self.column)?
            .unwrap_or(0.0);
        let avg = result.get(&AggregationFunction::Mean, &self.column)?;
        let variance = result.get(&AggregationFunction::PopulationVariance, &self.column)?;

        Ok(match (avg, variance) {
            (Some(avg), Some(variance)) if n > 0.0 => {
                Some(StandardDeviationState::new(n, avg, variance * n))
            }
            _ => None,
        })
    }
}
