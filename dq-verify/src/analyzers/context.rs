//! The metrics computed by one analysis run.

use std::collections::HashMap;
use std::ops::Add;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analyzer::{Analyzer, AnalyzerKey};
use crate::error::Result;
use crate::metrics::{Metric, MetricRecord};

/// Map from analyzer to its computed metric.
///
/// A context is built once per run and never mutated afterwards. Contexts can
/// be combined with [`AnalyzerContext::union`]; on key collisions the metric of
/// the right-hand context wins.
///
/// # Example
///
/// ```rust,ignore
/// use dq_verify::analyzers::{Analyzer, AnalysisRunner, Completeness};
///
/// let completeness = Analyzer::from(Completeness::new("user_id"));
/// let context = AnalysisRunner::new()
///     .do_analysis_run(&data, &[completeness.clone()])
///     .await;
///
/// if let Some(metric) = context.metric(&completeness) {
///     println!("{metric}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalyzerContext {
    metric_map: HashMap<Analyzer, Metric>,
    metadata: AnalysisMetadata,
}

impl AnalyzerContext {
    pub fn new(metric_map: HashMap<Analyzer, Metric>) -> Self {
        Self {
            metric_map,
            metadata: AnalysisMetadata::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_metadata(mut self, metadata: AnalysisMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metric(&self, analyzer: &Analyzer) -> Option<&Metric> {
        self.metric_map.get(analyzer)
    }

    pub fn metric_map(&self) -> &HashMap<Analyzer, Metric> {
        &self.metric_map
    }

    pub fn into_metric_map(self) -> HashMap<Analyzer, Metric> {
        self.metric_map
    }

    pub fn len(&self) -> usize {
        self.metric_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metric_map.is_empty()
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    /// Combines two contexts; `other` wins on key collisions.
    pub fn union(mut self, other: AnalyzerContext) -> Self {
        self.metric_map.extend(other.metric_map);
        self.metadata = self.metadata.merge(other.metadata);
        self
    }

    /// Metrics ordered by entity, name and instance, ties broken by the full
    /// analyzer key.
    fn sorted_entries(&self) -> Vec<(AnalyzerKey, &Metric)> {
        let mut entries: Vec<_> = self
            .metric_map
            .iter()
            .map(|(analyzer, metric)| (analyzer.key(), metric))
            .collect();
        entries.sort_by(|(key_a, a), (key_b, b)| {
            (a.entity, &a.name, &a.instance, key_a).cmp(&(b.entity, &b.name, &b.instance, key_b))
        });
        entries
    }

    /// All metrics ordered by entity, name and instance.
    pub fn all_metrics(&self) -> Vec<&Metric> {
        self.sorted_entries()
            .into_iter()
            .map(|(_, metric)| metric)
            .collect()
    }

    /// Report records in the order of [`AnalyzerContext::all_metrics`].
    pub fn metric_records(&self) -> Vec<MetricRecord> {
        self.sorted_entries()
            .into_iter()
            .map(|(key, metric)| MetricRecord {
                parameters: key.parameters,
                filter: key.filter,
                ..MetricRecord::from(metric)
            })
            .collect()
    }

    /// Successful metrics ordered by entity, name and instance.
    pub fn success_metrics(&self) -> Vec<&Metric> {
        self.all_metrics()
            .into_iter()
            .filter(|metric| metric.is_success())
            .collect()
    }

    /// Metrics whose computation failed.
    pub fn failed_metrics(&self) -> Vec<&Metric> {
        self.all_metrics()
            .into_iter()
            .filter(|metric| !metric.is_success())
            .collect()
    }

    /// Serializes every metric as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.metric_records())?)
    }
}

impl FromIterator<(Analyzer, Metric)> for AnalyzerContext {
    fn from_iter<I: IntoIterator<Item = (Analyzer, Metric)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Add for AnalyzerContext {
    type Output = AnalyzerContext;

    fn add(self, other: AnalyzerContext) -> AnalyzerContext {
        self.union(other)
    }
}

/// Timing of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AnalysisMetadata {
    pub fn started_now() -> Self {
        Self {
            start_time: Some(Utc::now()),
            end_time: None,
        }
    }

    pub fn finish(mut self) -> Self {
        self.end_time = Some(Utc::now());
        self
    }

    /// Returns the duration of the analysis if both start and end times are recorded.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Covers both runs: earliest start, latest end.
    fn merge(self, other: AnalysisMetadata) -> Self {
        Self {
            start_time: earliest(self.start_time, other.start_time),
            end_time: self.end_time.max(other.end_time),
        }
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
