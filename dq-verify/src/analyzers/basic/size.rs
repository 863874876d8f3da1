//! Row count analyzer.

use async_trait::async_trait;
use tracing::instrument;

use crate::analyzers::{AnalyzerDefinition, AnalyzerResult, NonScanAnalyzer, NumMatches};
use crate::data::Dataset;
use crate::metrics::Entity;

/// Number of rows, optionally after a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Size {
    filter: Option<String>,
}

impl Size {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: Option<String>) -> Self {
        Self { filter }
    }
}

impl AnalyzerDefinition for Size {
    fn name(&self) -> &'static str {
        "Size"
    }

    fn instance(&self) -> String {
        "*".to_string()
    }

    fn entity(&self) -> Entity {
        Entity::Dataset
    }

    fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }
}

#[async_trait]
impl NonScanAnalyzer for Size {
    type State = NumMatches;

    #[instrument(skip(self, data))]
    async fn compute_state_from(&self, data: &dyn Dataset) -> AnalyzerResult<Option<NumMatches>> {
        let num_matches = match self.filter() {
            Some(filter) => data.filter_rows(filter).num_rows().await?,
            None => data.num_rows().await?,
        };
        Ok(Some(NumMatches { num_matches }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Analyzer;
    use crate::test_fixtures::{missing_dataset, numeric_dataset};

    #[tokio::test]
    async fn test_size() {
        let data = missing_dataset().await;
        let metric = Analyzer::from(Size::new()).calculate(&data).await;
        assert_eq!(metric.value, Ok(12.0));
        assert_eq!(metric.entity, Entity::Dataset);
        assert_eq!(metric.instance, "*");
    }

    #[tokio::test]
    async fn test_size_with_filter() {
        let data = numeric_dataset().await;
        let size = Size::with_filter(Some("att2 > 0".to_string()));
        assert_eq!(Analyzer::from(size).calculate(&data).await.value, Ok(3.0));
    }

    #[tokio::test]
    async fn test_size_of_empty_view_is_zero() {
        let data = numeric_dataset().await;
        let size = Size::with_filter(Some("att1 > 100".to_string()));
        assert_eq!(Analyzer::from(size).calculate(&data).await.value, Ok(0.0));
    }
}
