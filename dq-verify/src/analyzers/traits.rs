//! Capability traits implemented by the concrete analyzers.
//!
//! Every analyzer describes itself through [`AnalyzerDefinition`]. On top of
//! that it implements exactly one way of turning data into state:
//!
//! * [`NonScanAnalyzer`] computes its state with its own queries.
//! * [`ScanShareableAnalyzer`] declares the aggregations it needs so the
//!   runner can merge them with other analyzers' requirements into one scan.
//! * [`GroupingAnalyzer`] derives its metric from row counts per distinct
//!   value of a tuple of columns.

use std::fmt::Debug;

use async_trait::async_trait;

use super::errors::AnalyzerResult;
use super::preconditions::Precondition;
use super::state::{DoubleValuedState, FrequenciesAndNumRows};
use crate::data::sql::quote_identifier;
use crate::data::{AggregationResult, AggregationSpec, Dataset};
use crate::metrics::Entity;

/// Identity and input requirements of an analyzer.
///
/// Identity is `(name, instance, entity, filter, parameters)`; two analyzers
/// with the same identity compute the same metric and are deduplicated.
pub trait AnalyzerDefinition: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Target of the metric: column name, joined columns, or `*`.
    fn instance(&self) -> String;

    fn entity(&self) -> Entity;

    /// Optional SQL predicate restricting the rows analyzed.
    fn filter(&self) -> Option<&str>;

    /// Extra identity, such as a quantile level or a predicate.
    fn parameters(&self) -> Option<String> {
        None
    }

    /// Checks run in order before computing; the first failure is reported.
    fn preconditions(&self) -> Vec<Precondition> {
        Vec::new()
    }
}

/// An analyzer that computes its state directly.
#[async_trait]
pub trait NonScanAnalyzer: AnalyzerDefinition {
    type State: DoubleValuedState + Send;

    async fn compute_state_from(&self, data: &dyn Dataset) -> AnalyzerResult<Option<Self::State>>;
}

/// An analyzer whose state comes from a set of per-column aggregations.
#[async_trait]
pub trait ScanShareableAnalyzer: AnalyzerDefinition {
    type State: DoubleValuedState + Send;

    /// Aggregations this analyzer needs, applied after its filter.
    fn aggregation_spec(&self) -> AggregationSpec;

    /// Extracts this analyzer's state from a (possibly shared) result.
    ///
    /// Values must be looked up by `(function, column)` key.
    fn state_from_aggregation_result(
        &self,
        result: &AggregationResult,
    ) -> AnalyzerResult<Option<Self::State>>;

    async fn compute_state_from(&self, data: &dyn Dataset) -> AnalyzerResult<Option<Self::State>> {
        let result = match self.filter() {
            Some(filter) => {
                data.filter_rows(filter)
                    .aggregate(&self.aggregation_spec())
                    .await?
            }
            None => data.aggregate(&self.aggregation_spec()).await?,
        };
        self.state_from_aggregation_result(&result)
    }
}

/// An analyzer computed from the frequencies of its grouping columns.
pub trait GroupingAnalyzer: AnalyzerDefinition {
    fn grouping_columns(&self) -> &[String];

    fn metric_from_frequencies(&self, state: &FrequenciesAndNumRows) -> f64;
}

/// Counts rows per distinct key of `columns`, after `filter`.
///
/// Rows where every grouping column is null are dropped. Null keys in the
/// remaining rows are kept as their own group. Returns `None` when no rows
/// remain.
pub async fn compute_frequencies(
    data: &dyn Dataset,
    columns: &[String],
    filter: Option<&str>,
) -> AnalyzerResult<Option<FrequenciesAndNumRows>> {
    let any_present = columns
        .iter()
        .map(|c| format!("{} IS NOT NULL", quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(" OR ");

    let view = match filter {
        Some(filter) => data.filter_rows(filter).filter_rows(&any_present),
        None => data.filter_rows(&any_present),
    };
    let state = FrequenciesAndNumRows::new(view.group_by_count(columns).await?);
    Ok((state.num_rows > 0).then_some(state))
}

/// Renders an analyzer as `Name(instance[, parameters][, where: filter])`.
pub fn describe(analyzer: &dyn AnalyzerDefinition) -> String {
    let mut parts = vec![analyzer.instance()];
    if let Some(parameters) = analyzer.parameters() {
        parts.push(parameters);
    }
    if let Some(filter) = analyzer.filter() {
        parts.push(format!("where: {filter}"));
    }
    format!("{}({})", analyzer.name(), parts.join(", "))
}
