//! Compliance analyzer: fraction of rows satisfying a SQL predicate.

use async_trait::async_trait;
use tracing::instrument;

use crate::analyzers::{AnalyzerDefinition, AnalyzerResult, NonScanAnalyzer, NumMatchesAndCount};
use crate::data::Dataset;
use crate::metrics::Entity;

/// Fraction of rows for which `predicate` is true. Null outcomes count as false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compliance {
    instance: String,
    predicate: String,
    filter: Option<String>,
}

impl Compliance {
    pub fn new(instance: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            predicate: predicate.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }
}

impl AnalyzerDefinition for Compliance {
    fn name(&self) -> &'static str {
        "Compliance"
    }

    fn instance(&self) -> String {
        self.instance.clone()
    }

    fn entity(&self) -> Entity {
        Entity::Column
    }

    fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn parameters(&self) -> Option<String> {
        Some(self.predicate.clone())
    }
}

#[async_trait]
impl NonScanAnalyzer for Compliance {
    type State = NumMatchesAndCount;

    #[instrument(skip(self, data), fields(predicate = %self.predicate))]
    async fn compute_state_from(
        &self,
        data: &dyn Dataset,
    ) -> AnalyzerResult<Option<NumMatchesAndCount>> {
        let outcomes = match self.filter() {
            Some(filter) => data.filter_rows(filter).evaluate_expr(&self.predicate).await?,
            None => data.evaluate_expr(&self.predicate).await?,
        };
        Ok(Some(NumMatchesAndCount {
            num_matches: outcomes.true_count() as u64,
            count: outcomes.len() as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{Analyzer, AnalyzerError};
    use crate::test_fixtures::{numbers_dataset, numeric_dataset};

    #[tokio::test]
    async fn test_compliance() {
        let data = numeric_dataset().await;
        let over_three = Analyzer::from(Compliance::new("rule1", "att1 > 3"));
        let over_two = Analyzer::from(Compliance::new("rule2", "att1 > 2"));
        assert_eq!(over_three.calculate(&data).await.value, Ok(0.5));
        assert_eq!(over_two.calculate(&data).await.value, Ok(4.0 / 6.0));
    }

    #[tokio::test]
    async fn test_compliance_with_filter() {
        let data = numeric_dataset().await;
        let rule = Compliance::new("rule", "att2 = 0").with_filter(Some("att1 < 4".into()));
        assert_eq!(Analyzer::from(rule).calculate(&data).await.value, Ok(1.0));
    }

    #[tokio::test]
    async fn test_null_outcomes_do_not_match() {
        let data = numbers_dataset(&[Some(1.0), None, Some(5.0), None]).await;
        let rule = Analyzer::from(Compliance::new("rule", "value > 0"));
        assert_eq!(rule.calculate(&data).await.value, Ok(0.5));
    }

    #[tokio::test]
    async fn test_invalid_predicate_fails() {
        let data = numeric_dataset().await;
        let rule = Analyzer::from(Compliance::new("rule", "no_such_column > 3"));
        let metric = rule.calculate(&data).await;
        assert!(matches!(metric.value, Err(AnalyzerError::QueryExecution(_))));
    }
}
