//! Scheduling of analyzers onto as few scans of the data as possible.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::analyzer::{Analyzer, Grouping, NonScan, ScanShareable};
use super::context::{AnalysisMetadata, AnalyzerContext};
use super::preconditions::find_first_failing;
use super::traits::compute_frequencies;
use crate::data::{AggregationSpec, Dataset};
use crate::logging::LogConfig;
use crate::metrics::Metric;
use crate::{log_metric, perf_debug};

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// How scan-shareable analyzers are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One merged aggregation per filter group. If that query fails, every
    /// analyzer in the group fails with the same error.
    #[default]
    SharedScan,
    /// One aggregation per analyzer, so failures stay with their analyzer.
    Sequential,
}

/// Configuration for an [`AnalysisRunner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub execution_mode: ExecutionMode,
}

impl RunnerConfig {
    pub fn sequential() -> Self {
        Self {
            execution_mode: ExecutionMode::Sequential,
        }
    }
}

/// Runs a set of analyzers against a dataset.
///
/// Analyzers are deduplicated by identity, validated against the dataset's
/// schema, and then executed:
///
/// * scan-shareable analyzers with the same filter share one aggregation query;
/// * grouping analyzers with the same columns and filter share one `GROUP BY`;
/// * the remaining analyzers run on their own.
///
/// The run never fails. Each analyzer gets a metric, successful or not.
///
/// # Example
///
/// ```rust,ignore
/// use dq_verify::analyzers::{AnalysisRunner, Analyzer, Completeness, Mean, Size};
///
/// let analyzers = vec![
///     Analyzer::from(Size::new()),
///     Analyzer::from(Completeness::new("user_id")),
///     Analyzer::from(Mean::new("amount")),
/// ];
/// let context = AnalysisRunner::new()
///     .on_progress(|progress| println!("{:.0}%", progress * 100.0))
///     .do_analysis_run(&data, &analyzers)
///     .await;
/// println!("Computed {} metrics", context.len());
/// ```
#[derive(Clone, Default)]
pub struct AnalysisRunner {
    config: RunnerConfig,
    log: LogConfig,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for AnalysisRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRunner")
            .field("config", &self.config)
            .field("log", &self.log)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

type ScanGroups<'a> = BTreeMap<Option<&'a str>, Vec<(&'a Analyzer, &'a ScanShareable)>>;
type FrequencyGroups<'a> = BTreeMap<(&'a [String], Option<&'a str>), Vec<(&'a Analyzer, &'a Grouping)>>;

impl AnalysisRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Sets a progress callback that will be called during execution.
    ///
    /// The callback receives a float between 0.0 and 1.0 indicating progress.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Computes a metric for every distinct analyzer.
    #[instrument(skip(self, data, analyzers), fields(analyzer_count = analyzers.len(), mode = ?self.config.execution_mode))]
    pub async fn do_analysis_run(&self, data: &dyn Dataset, analyzers: &[Analyzer]) -> AnalyzerContext {
        let metadata = AnalysisMetadata::started_now();
        let analyzers = deduplicate(analyzers);
        info!("Starting analysis with {} distinct analyzers", analyzers.len());

        let mut metrics = Vec::with_capacity(analyzers.len());
        let mut passing = Vec::with_capacity(analyzers.len());
        for analyzer in analyzers {
            match find_first_failing(data, &analyzer.preconditions()) {
                Some(violation) => {
                    perf_debug!(
                        self.log,
                        analyzer = %self.log.truncate(&analyzer.to_string()),
                        error = %violation,
                        "Precondition failed"
                    );
                    metrics.push((analyzer.clone(), analyzer.failure(violation)));
                }
                None => passing.push(analyzer),
            }
        }

        match self.config.execution_mode {
            ExecutionMode::SharedScan => metrics.extend(self.run_shared(data, &passing).await),
            ExecutionMode::Sequential => metrics.extend(self.run_sequential(data, &passing).await),
        }

        for (analyzer, metric) in &metrics {
            log_metric!(
                self.log,
                analyzer = %self.log.truncate(&analyzer.to_string()),
                value = ?metric.value,
                "Computed metric"
            );
        }

        let failed = metrics.iter().filter(|(_, m)| !m.is_success()).count();
        if failed > 0 {
            warn!("{failed} of {} metrics could not be computed", metrics.len());
        }

        let metadata = metadata.finish();
        if let Some(duration) = metadata.duration() {
            info!(
                "Analysis completed in {:.2}s",
                duration.num_milliseconds() as f64 / 1000.0
            );
        }
        metrics
            .into_iter()
            .collect::<AnalyzerContext>()
            .with_metadata(metadata)
    }

    async fn run_sequential(&self, data: &dyn Dataset, analyzers: &[&Analyzer]) -> Vec<(Analyzer, Metric)> {
        let mut progress = Progress::new(self.on_progress.as_ref(), analyzers.len());
        let mut metrics = Vec::with_capacity(analyzers.len());
        for analyzer in analyzers {
            metrics.push(((*analyzer).clone(), analyzer.compute_metric(data).await));
            progress.step();
        }
        metrics
    }

    async fn run_shared(&self, data: &dyn Dataset, analyzers: &[&Analyzer]) -> Vec<(Analyzer, Metric)> {
        let mut non_scan: Vec<(&Analyzer, &NonScan)> = Vec::new();
        let mut scan_groups = ScanGroups::new();
        let mut frequency_groups = FrequencyGroups::new();
        for &analyzer in analyzers {
            match analyzer {
                Analyzer::NonScan(inner) => non_scan.push((analyzer, inner)),
                Analyzer::ScanShareable(inner) => scan_groups
                    .entry(analyzer.filter())
                    .or_default()
                    .push((analyzer, inner)),
                Analyzer::Grouping(inner) => frequency_groups
                    .entry((inner.grouping_columns(), analyzer.filter()))
                    .or_default()
                    .push((analyzer, inner)),
            }
        }
        if self.log.log_scan_plan {
            debug!(
                scans = scan_groups.len(),
                groupings = frequency_groups.len(),
                standalone = non_scan.len(),
                "Planned analysis"
            );
        }

        let units = non_scan.len() + scan_groups.len() + frequency_groups.len();
        let mut progress = Progress::new(self.on_progress.as_ref(), units);
        let mut metrics = Vec::with_capacity(analyzers.len());

        for (filter, group) in scan_groups {
            let mut spec = AggregationSpec::new();
            for (_, inner) in &group {
                spec.merge(&inner.aggregation_spec());
            }
            let result = match filter {
                Some(filter) => data.filter_rows(filter).aggregate(&spec).await,
                None => data.aggregate(&spec).await,
            };
            match result {
                Ok(result) => metrics.extend(group.into_iter().map(|(analyzer, inner)| {
                    (analyzer.clone(), inner.metric_from_aggregation_result(&result))
                })),
                Err(e) => {
                    error!(filter = ?filter.map(|f| self.log.truncate(f)), analyzers = group.len(), "Shared aggregation failed: {e}");
                    metrics.extend(
                        group
                            .into_iter()
                            .map(|(analyzer, _)| (analyzer.clone(), analyzer.failure(e.clone()))),
                    );
                }
            }
            progress.step();
        }

        for ((columns, filter), group) in frequency_groups {
            let state = compute_frequencies(data, columns, filter).await;
            metrics.extend(
                group
                    .into_iter()
                    .map(|(analyzer, inner)| (analyzer.clone(), inner.metric_from_frequencies(&state))),
            );
            progress.step();
        }

        for (analyzer, _) in non_scan {
            metrics.push((analyzer.clone(), analyzer.compute_metric(data).await));
            progress.step();
        }

        metrics
    }
}

/// Drops repeated analyzers, keeping the first occurrence.
fn deduplicate(analyzers: &[Analyzer]) -> Vec<&Analyzer> {
    let mut seen = HashSet::new();
    analyzers
        .iter()
        .filter(|analyzer| seen.insert(analyzer.key()))
        .collect()
}

struct Progress<'a> {
    callback: Option<&'a ProgressCallback>,
    total: usize,
    completed: usize,
}

impl<'a> Progress<'a> {
    fn new(callback: Option<&'a ProgressCallback>, total: usize) -> Self {
        Self {
            callback,
            total,
            completed: 0,
        }
    }

    fn step(&mut self) {
        self.completed += 1;
        if let Some(callback) = self.callback {
            callback(self.completed as f64 / self.total.max(1) as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{
        AnalyzerError, Completeness, Compliance, Maximum, Mean, Minimum, Quantile, Size, Uniqueness,
    };
    use crate::test_fixtures::{missing_dataset, numeric_dataset};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_runner_computes_every_analyzer() {
        let data = numeric_dataset().await;
        let analyzers = vec![
            Analyzer::from(Size::new()),
            Analyzer::from(Minimum::new("att1")),
            Analyzer::from(Maximum::new("att1")),
            Analyzer::from(Mean::new("att1").with_filter(Some("item != '6'".into()))),
            Analyzer::from(Compliance::new("rule", "att1 > 3")),
            Analyzer::from(Uniqueness::new(["att2"])),
        ];

        let context = AnalysisRunner::new().do_analysis_run(&data, &analyzers).await;

        assert_eq!(context.len(), 6);
        let value = |a: &Analyzer| context.metric(a).map(|m| m.value.clone());
        assert_eq!(value(&analyzers[0]), Some(Ok(6.0)));
        assert_eq!(value(&analyzers[1]), Some(Ok(1.0)));
        assert_eq!(value(&analyzers[2]), Some(Ok(6.0)));
        assert_eq!(value(&analyzers[3]), Some(Ok(3.0)));
        assert_eq!(value(&analyzers[4]), Some(Ok(0.5)));
        assert_eq!(value(&analyzers[5]), Some(Ok(0.5)));
        assert!(context.metadata().duration().is_some());
    }

    #[tokio::test]
    async fn test_duplicates_are_computed_once() {
        let data = missing_dataset().await;
        let analyzers = vec![
            Analyzer::from(Completeness::new("att1")),
            Analyzer::from(Completeness::new("att1")),
            Analyzer::from(Completeness::new("att2")),
        ];
        let context = AnalysisRunner::new().do_analysis_run(&data, &analyzers).await;
        assert_eq!(context.len(), 2);
    }

    #[tokio::test]
    async fn test_precondition_failures_are_reported() {
        let data = missing_dataset().await;
        let analyzers = vec![
            Analyzer::from(Mean::new("att1")),
            Analyzer::from(Completeness::new("nope")),
            Analyzer::from(Completeness::new("att1")),
        ];
        let context = AnalysisRunner::new().do_analysis_run(&data, &analyzers).await;

        assert!(matches!(
            context.metric(&analyzers[0]).map(|m| &m.value),
            Some(Err(AnalyzerError::WrongType { .. }))
        ));
        assert_eq!(
            context.metric(&analyzers[1]).map(|m| m.value.clone()),
            Some(Err(AnalyzerError::missing_column("nope")))
        );
        assert_eq!(
            context.metric(&analyzers[2]).map(|m| m.value.clone()),
            Some(Ok(0.5))
        );
    }

    #[tokio::test]
    async fn test_shared_scan_fails_together() {
        let data = numeric_dataset().await;
        let analyzers = vec![
            Analyzer::from(Minimum::new("att1")),
            Analyzer::from(Quantile::new("att1", 1.5)),
            Analyzer::from(Minimum::new("att2").with_filter(Some("att1 > 1".into()))),
        ];

        let context = AnalysisRunner::new().do_analysis_run(&data, &analyzers).await;

        assert_eq!(
            context.metric(&analyzers[0]).map(|m| m.value.clone()),
            Some(Err(AnalyzerError::InvalidQuantile(1.5)))
        );
        assert_eq!(
            context.metric(&analyzers[1]).map(|m| m.value.clone()),
            Some(Err(AnalyzerError::InvalidQuantile(1.5)))
        );
        // A different filter is a different scan.
        assert_eq!(
            context.metric(&analyzers[2]).map(|m| m.value.clone()),
            Some(Ok(0.0))
        );
    }

    #[tokio::test]
    async fn test_sequential_mode_isolates_failures() {
        let data = numeric_dataset().await;
        let analyzers = vec![
            Analyzer::from(Minimum::new("att1")),
            Analyzer::from(Quantile::new("att1", 1.5)),
        ];

        let context = AnalysisRunner::with_config(RunnerConfig::sequential())
            .do_analysis_run(&data, &analyzers)
            .await;

        assert_eq!(
            context.metric(&analyzers[0]).map(|m| m.value.clone()),
            Some(Ok(1.0))
        );
        assert_eq!(
            context.metric(&analyzers[1]).map(|m| m.value.clone()),
            Some(Err(AnalyzerError::InvalidQuantile(1.5)))
        );
    }

    #[tokio::test]
    async fn test_progress_reaches_completion() {
        let data = numeric_dataset().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let analyzers = vec![
            Analyzer::from(Size::new()),
            Analyzer::from(Minimum::new("att1")),
            Analyzer::from(Maximum::new("att1")),
        ];

        AnalysisRunner::new()
            .on_progress(move |p| sink.lock().unwrap().push(p))
            .do_analysis_run(&data, &analyzers)
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.last(), Some(&1.0));
    }

    #[tokio::test]
    async fn test_empty_run() {
        let data = numeric_dataset().await;
        let context = AnalysisRunner::new().do_analysis_run(&data, &[]).await;
        assert!(context.is_empty());
    }

    #[test]
    fn test_config_serde() {
        let config: RunnerConfig = serde_json::from_str(r#"{"execution_mode":"sequential"}"#).unwrap();
        assert_eq!(config, RunnerConfig::sequential());
        let config: RunnerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.execution_mode, ExecutionMode::SharedScan);
    }
}
