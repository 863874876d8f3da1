//! Results of evaluating checks and verification runs.

use serde::Serialize;

use super::level::{CheckLevel, CheckStatus};
use crate::analyzers::{AnalysisMetadata, AnalyzerContext};
use crate::constraints::ConstraintResult;
use crate::error::Result;
use crate::metrics::MetricRecord;

/// The outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// Description of the evaluated check.
    pub description: String,
    pub level: CheckLevel,
    pub status: CheckStatus,
    /// One result per constraint, in declaration order.
    pub constraint_results: Vec<ConstraintResult>,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }

    /// Constraint results that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.constraint_results.iter().filter(|r| !r.is_success())
    }
}

/// The outcome of a verification run.
///
/// `check_results` follows the order in which checks were added to the suite.
/// `metrics` holds every metric computed during the single analysis pass.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub status: CheckStatus,
    pub check_results: Vec<CheckResult>,
    pub metrics: AnalyzerContext,
}

#[derive(Serialize)]
struct VerificationReport<'a> {
    status: CheckStatus,
    check_results: &'a [CheckResult],
    metrics: Vec<MetricRecord>,
    metadata: &'a AnalysisMetadata,
}

impl VerificationResult {
    /// Builds a result, rolling the overall status up from the check results.
    pub fn new(check_results: Vec<CheckResult>, metrics: AnalyzerContext) -> Self {
        let status = check_results
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(CheckStatus::Success);
        Self {
            status,
            check_results,
            metrics,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }

    /// Looks up the result of the check with the given description.
    pub fn check_result(&self, description: &str) -> Option<&CheckResult> {
        self.check_results.iter().find(|r| r.description == description)
    }

    /// Every failed constraint across all checks.
    pub fn failed_constraints(&self) -> Vec<&ConstraintResult> {
        self.check_results.iter().flat_map(|r| r.failures()).collect()
    }

    /// Renders statuses, constraint results and metrics as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        let report = VerificationReport {
            status: self.status,
            check_results: &self.check_results,
            metrics: self.metrics.metric_records(),
            metadata: self.metrics.metadata(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
