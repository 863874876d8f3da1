//! Exact quantile analyzer.

use crate::analyzers::{
    AnalyzerDefinition, AnalyzerResult, Precondition, QuantileState, ScanShareableAnalyzer,
};
use crate::data::{AggregationFunction, AggregationResult, AggregationSpec};
use crate::metrics::Entity;

/// Nearest-rank quantile of a numeric column.
///
/// The result is always a value present in the column. The quantile level
/// must lie in `[0, 1]`; other levels produce a failed metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantile {
    column: String,
    quantile: f64,
    filter: Option<String>,
}

impl Quantile {
    pub fn new(column: impl Into<String>, quantile: f64) -> Self {
        Self {
            column: column.into(),
            quantile,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    fn function(&self) -> AggregationFunction {
        AggregationFunction::quantile(self.quantile)
    }
}

impl AnalyzerDefinition for Quantile {
    fn name(&self) -> &'static str {
        "Quantile"
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
        Some(self.quantile.to_string())
    }

    fn preconditions(&self) -> Vec<Precondition> {
        vec![
            Precondition::has_column(&self.column),
            Precondition::is_numeric(&self.column),
        ]
    }
}

impl ScanShareableAnalyzer for Quantile {
    type State = QuantileState;

    fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::new().with(&self.column, self.function())
    }

    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<QuantileState>> {
        let value = result.get(&self.function(), &self.column)?;
        Ok(value.map(|value| QuantileState { value }))
    }
}
