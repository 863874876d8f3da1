//! Verification suite: runs checks over a dataset in one analysis pass.

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use super::check::Check;
use super::level::CheckStatus;
use super::result::VerificationResult;
use crate::analyzers::{AnalysisRunner, Analyzer, RunnerConfig};
use crate::data::Dataset;
use crate::logging::LogConfig;

/// A collection of checks and extra analyzers evaluated together.
///
/// # Examples
///
/// ```rust,no_run
/// use dq_verify::prelude::*;
///
/// # async fn example(data: &DataFusionDataset) -> dq_verify::Result<()> {
/// let result = VerificationSuite::new()
///     .add_check(
///         Check::new(CheckLevel::Error, "ids")
///             .is_complete("id", None)
///             .is_unique("id", None),
///     )
///     .run(data)
///     .await;
///
/// if result.status != CheckStatus::Success {
///     println!("{}", result.to_json()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct VerificationSuite {
    checks: Vec<Check>,
    required_analyzers: Vec<Analyzer>,
    runner_config: RunnerConfig,
    log_config: LogConfig,
}

impl VerificationSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner_config(mut self, config: RunnerConfig) -> Self {
        self.runner_config = config;
        self
    }

    pub fn with_log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    pub fn add_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn add_checks(mut self, checks: impl IntoIterator<Item = Check>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Computes `analyzer` even if no constraint needs it.
    pub fn add_required_analyzer(mut self, analyzer: impl Into<Analyzer>) -> Self {
        self.required_analyzers.push(analyzer.into());
        self
    }

    pub fn add_required_analyzers(mut self, analyzers: impl IntoIterator<Item = Analyzer>) -> Self {
        self.required_analyzers.extend(analyzers);
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn runner_config(&self) -> &RunnerConfig {
        &self.runner_config
    }

    /// Starts a run bound to `data`.
    pub fn on_data(data: &dyn Dataset) -> VerificationRunBuilder<'_> {
        VerificationRunBuilder {
            data,
            suite: VerificationSuite::new(),
        }
    }

    /// Distinct analyzers needed by the extra analyzers and every check.
    pub fn required_analyzers(&self) -> Vec<Analyzer> {
        let mut seen = HashSet::new();
        self.required_analyzers
            .iter()
            .cloned()
            .chain(self.checks.iter().flat_map(Check::required_analyzers))
            .filter(|analyzer| seen.insert(analyzer.clone()))
            .collect()
    }

    /// Computes all required metrics in one analysis run and evaluates every check.
    #[instrument(skip(self, data), fields(checks = self.checks.len()))]
    pub async fn run(&self, data: &dyn Dataset) -> VerificationResult {
        let analyzers = self.required_analyzers();
        info!(
            "Running verification with {} checks over {} analyzers",
            self.checks.len(),
            analyzers.len()
        );

        let context = AnalysisRunner::with_config(self.runner_config.clone())
            .with_log_config(self.log_config.clone())
            .do_analysis_run(data, &analyzers)
            .await;

        let check_results = self.checks.iter().map(|check| check.evaluate(&context)).collect();
        let result = VerificationResult::new(check_results, context);

        match result.status {
            CheckStatus::Success => info!("Verification succeeded"),
            status => warn!(
                %status,
                failed_constraints = result.failed_constraints().len(),
                "Verification did not succeed"
            ),
        }
        result
    }
}

/// A suite bound to a dataset, from [`VerificationSuite::on_data`].
#[derive(Debug)]
pub struct VerificationRunBuilder<'a> {
    data: &'a dyn Dataset,
    suite: VerificationSuite,
}

impl<'a> VerificationRunBuilder<'a> {
    pub fn with_runner_config(mut self, config: RunnerConfig) -> Self {
        self.suite = self.suite.with_runner_config(config);
        self
    }

    pub fn add_check(mut self, check: Check) -> Self {
        self.suite = self.suite.add_check(check);
        self
    }

    pub fn add_checks(mut self, checks: impl IntoIterator<Item = Check>) -> Self {
        self.suite = self.suite.add_checks(checks);
        self
    }

    pub fn add_required_analyzer(mut self, analyzer: impl Into<Analyzer>) -> Self {
        self.suite = self.suite.add_required_analyzer(analyzer);
        self
    }

    pub fn add_required_analyzers(mut self, analyzers: impl IntoIterator<Item = Analyzer>) -> Self {
        self.suite = self.suite.add_required_analyzers(analyzers);
        self
    }

    pub async fn run(self) -> VerificationResult {
        self.suite.run(self.data).await
    }
}
