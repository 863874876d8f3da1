//! The closed set of analyzers and their dispatch.
//!
//! [`Analyzer`] is a tagged union over the three computation strategies. Each
//! strategy enum knows its concrete analyzers, so dispatch is a `match` rather
//! than dynamic lookup, and the runner can inspect which strategy applies.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::advanced::{Compliance, PatternMatch, Quantile, StandardDeviation};
use super::basic::{Completeness, Maximum, Mean, Minimum, Size, Sum};
use super::errors::{AnalyzerError, AnalyzerResult};
use super::grouped::Uniqueness;
use super::preconditions::{find_first_failing, Precondition};
use super::state::{DoubleValuedState, FrequenciesAndNumRows};
use super::traits::{
    compute_frequencies, describe, AnalyzerDefinition, GroupingAnalyzer, NonScanAnalyzer,
    ScanShareableAnalyzer,
};
use crate::data::{AggregationResult, AggregationSpec, Dataset};
use crate::metrics::{Entity, Metric};

/// Identity of an analyzer, used for equality, hashing and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnalyzerKey {
    pub name: &'static str,
    pub instance: String,
    pub entity: Entity,
    pub filter: Option<String>,
    pub parameters: Option<String>,
}

impl AnalyzerKey {
    fn of(definition: &dyn AnalyzerDefinition) -> Self {
        Self {
            name: definition.name(),
            instance: definition.instance(),
            entity: definition.entity(),
            filter: definition.filter().map(str::to_string),
            parameters: definition.parameters(),
        }
    }
}

/// Analyzers that compute their state with dedicated queries.
#[derive(Debug, Clone)]
pub enum NonScan {
    Size(Size),
    Compliance(Compliance),
}

/// Analyzers whose aggregations can share a single scan.
#[derive(Debug, Clone)]
pub enum ScanShareable {
    Completeness(Completeness),
    PatternMatch(PatternMatch),
    Minimum(Minimum),
    Maximum(Maximum),
    Mean(Mean),
    Sum(Sum),
    StandardDeviation(StandardDeviation),
    Quantile(Quantile),
}

/// Analyzers computed from value frequencies of grouping columns.
#[derive(Debug, Clone)]
pub enum Grouping {
    Uniqueness(Uniqueness),
}

/// Any analyzer the engine can run.
#[derive(Debug, Clone)]
pub enum Analyzer {
    NonScan(NonScan),
    ScanShareable(ScanShareable),
    Grouping(Grouping),
}

macro_rules! scan_shareable_dispatch {
    ($value:expr, $analyzer:ident => $body:expr) => {
        match $value {
            ScanShareable::Completeness($analyzer) => $body,
            ScanShareable::PatternMatch($analyzer) => $body,
            ScanShareable::Minimum($analyzer) => $body,
            ScanShareable::Maximum($analyzer) => $body,
            ScanShareable::Mean($analyzer) => $body,
            ScanShareable::Sum($analyzer) => $body,
            ScanShareable::StandardDeviation($analyzer) => $body,
            ScanShareable::Quantile($analyzer) => $body,
        }
    };
}

fn metric_from_state<S: DoubleValuedState>(
    definition: &dyn AnalyzerDefinition,
    state: AnalyzerResult<Option<S>>,
) -> Metric {
    let value = match state {
        Ok(Some(state)) => Ok(state.metric_value()),
        Ok(None) => Err(AnalyzerError::empty_state(describe(definition))),
        Err(e) => Err(e),
    };
    Metric {
        entity: definition.entity(),
        name: definition.name().to_string(),
        instance: definition.instance(),
        value,
    }
}

impl NonScan {
    pub fn definition(&self) -> &dyn AnalyzerDefinition {
        match self {
            Self::Size(a) => a,
            Self::Compliance(a) => a,
        }
    }

    async fn compute_metric(&self, data: &dyn Dataset) -> Metric {
        match self {
            Self::Size(a) => metric_from_state(a, a.compute_state_from(data).await),
            Self::Compliance(a) => metric_from_state(a, a.compute_state_from(data).await),
        }
    }
}

impl ScanShareable {
    pub fn definition(&self) -> &dyn AnalyzerDefinition {
        scan_shareable_dispatch!(self, a => a)
    }

    pub fn aggregation_spec(&self) -> AggregationSpec {
        scan_shareable_dispatch!(self, a => a.aggregation_spec())
    }

    /// Builds the metric from a result that may contain other analyzers' values.
    pub fn metric_from_aggregation_result(&self, result: &AggregationResult) -> Metric {
        scan_shareable_dispatch!(self, a => metric_from_state(a, a.state_from_aggregation_result(result)))
    }

    async fn compute_metric(&self, data: &dyn Dataset) -> Metric {
        scan_shareable_dispatch!(self, a => metric_from_state(a, a.compute_state_from(data).await))
    }
}

impl Grouping {
    pub fn definition(&self) -> &dyn AnalyzerDefinition {
        match self {
            Self::Uniqueness(a) => a,
        }
    }

    pub fn grouping_columns(&self) -> &[String] {
        match self {
            Self::Uniqueness(a) => a.grouping_columns(),
        }
    }

    /// Builds the metric from frequencies of this analyzer's grouping columns.
    pub fn metric_from_frequencies(
        &self,
        state: &AnalyzerResult<Option<FrequenciesAndNumRows>>,
    ) -> Metric {
        let definition = self.definition();
        let value = match state {
            Ok(Some(state)) => Ok(match self {
                Self::Uniqueness(a) => a.metric_from_frequencies(state),
            }),
            Ok(None) => Err(AnalyzerError::empty_state(describe(definition))),
            Err(e) => Err(e.clone()),
        };
        Metric {
            entity: definition.entity(),
            name: definition.name().to_string(),
            instance: definition.instance(),
            value,
        }
    }

    async fn compute_metric(&self, data: &dyn Dataset) -> Metric {
        let definition = self.definition();
        let state = compute_frequencies(data, self.grouping_columns(), definition.filter()).await;
        self.metric_from_frequencies(&state)
    }
}

impl Analyzer {
    pub fn definition(&self) -> &dyn AnalyzerDefinition {
        match self {
            Self::NonScan(a) => a.definition(),
            Self::ScanShareable(a) => a.definition(),
            Self::Grouping(a) => a.definition(),
        }
    }

    pub fn key(&self) -> AnalyzerKey {
        AnalyzerKey::of(self.definition())
    }

    pub fn name(&self) -> &'static str {
        self.definition().name()
    }

    pub fn instance(&self) -> String {
        self.definition().instance()
    }

    pub fn entity(&self) -> Entity {
        self.definition().entity()
    }

    pub fn filter(&self) -> Option<&str> {
        self.definition().filter()
    }

    pub fn preconditions(&self) -> Vec<Precondition> {
        self.definition().preconditions()
    }

    /// Validates the preconditions, then computes the metric.
    ///
    /// Never fails: every error ends up in the returned metric's value.
    pub async fn calculate(&self, data: &dyn Dataset) -> Metric {
        if let Some(error) = find_first_failing(data, &self.preconditions()) {
            return self.failure(error);
        }
        self.compute_metric(data).await
    }

    /// Computes the metric without checking preconditions.
    pub(crate) async fn compute_metric(&self, data: &dyn Dataset) -> Metric {
        match self {
            Self::NonScan(a) => a.compute_metric(data).await,
            Self::ScanShareable(a) => a.compute_metric(data).await,
            Self::Grouping(a) => a.compute_metric(data).await,
        }
    }

    /// A failed metric for this analyzer.
    pub fn failure(&self, error: AnalyzerError) -> Metric {
        Metric::failure(self.entity(), self.name(), &self.instance(), error)
    }
}

impl PartialEq for Analyzer {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Analyzer {}

impl Hash for Analyzer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self.definition()))
    }
}

macro_rules! impl_from_analyzer {
    ($($analyzer:ident => $strategy:ident),* $(,)?) => {
        $(
            impl From<$analyzer> for Analyzer {
                fn from(analyzer: $analyzer) -> Self {
                    Analyzer::$strategy($strategy::$analyzer(analyzer))
                }
            }
        )*
    };
}

impl_from_analyzer!(
    Size => NonScan,
    Compliance => NonScan,
    Completeness => ScanShareable,
    PatternMatch => ScanShareable,
    Minimum => ScanShareable,
    Maximum => ScanShareable,
    Mean => ScanShareable,
    Sum => ScanShareable,
    StandardDeviation => ScanShareable,
    Quantile => ScanShareable,
    Uniqueness => Grouping,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{missing_dataset, numeric_dataset};
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_construction_path() {
        let a = Analyzer::from(Completeness::new("att1"));
        let b = Analyzer::from(Completeness::new("att1").with_filter(None));
        let filtered = Analyzer::from(Completeness::new("att1").with_filter(Some("x > 1".into())));

        let set: HashSet<Analyzer> = [a.clone(), b, filtered.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
        assert!(set.contains(&filtered));
    }

    #[test]
    fn test_display() {
        assert_eq!(Analyzer::from(Completeness::new("att1")).to_string(), "Completeness(att1)");
        assert_eq!(Analyzer::from(Size::new()).to_string(), "Size(*)");
        assert_eq!(
            Analyzer::from(Quantile::new("att1", 0.5).with_filter(Some("att2 > 0".into())))
                .to_string(),
            "Quantile(att1, 0.5, where: att2 > 0)"
        );
    }

    #[test]
    fn test_different_predicates_are_distinct() {
        let a = Analyzer::from(Compliance::new("rule", "att1 > 3"));
        let b = Analyzer::from(Compliance::new("rule", "att1 > 4"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_calculate_is_deterministic() {
        let data = numeric_dataset().await;
        let analyzer = Analyzer::from(StandardDeviation::new("att1"));
        let first = analyzer.calculate(&data).await;
        let second = analyzer.calculate(&data).await;
        assert_eq!(
            first.value.map(f64::to_bits),
            second.value.map(f64::to_bits)
        );
    }

    #[tokio::test]
    async fn test_empty_state_message() {
        let data = numeric_dataset().await;
        let analyzer = Analyzer::from(Mean::new("att1").with_filter(Some("att1 > 10".into())));
        let metric = analyzer.calculate(&data).await;
        assert_eq!(
            metric.value.unwrap_err().to_string(),
            "Empty state for analyzer Mean(att1, where: att1 > 10), all input values were NULL."
        );
    }

    #[tokio::test]
    async fn test_precondition_failure_short_circuits() {
        let data = missing_dataset().await;
        let metric = Analyzer::from(Quantile::new("att1", 5.0)).calculate(&data).await;
        // The type check fails before the invalid quantile is noticed.
        assert!(matches!(metric.value, Err(AnalyzerError::WrongType { .. })));
    }
}
