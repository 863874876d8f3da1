//! Constraints: assertions over analyzer metrics.

use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use super::assertion::Assertion;
use crate::analyzers::{Analyzer, AnalyzerContext};
use crate::metrics::{Metric, MetricRecord};

/// Message of a constraint whose analyzer has no metric in the context.
pub const MISSING_ANALYSIS_MESSAGE: &str = "Missing Analysis, can't run the constraint!";

/// Prefix of a constraint whose assertion could not be executed.
pub const ASSERTION_EXCEPTION_MESSAGE: &str = "Can't execute the assertion";

/// The status of a constraint evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStatus {
    Success,
    Failure,
}

/// The result of evaluating one constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintResult {
    /// Name of the evaluated constraint.
    pub constraint: String,
    pub status: ConstraintStatus,
    /// Why the constraint failed; `None` on success.
    pub message: Option<String>,
    /// The metric the constraint was evaluated on, if it was available.
    #[serde(serialize_with = "serialize_metric")]
    pub metric: Option<Metric>,
}

impl ConstraintResult {
    pub fn success(constraint: impl Into<String>, metric: Metric) -> Self {
        Self {
            constraint: constraint.into(),
            status: ConstraintStatus::Success,
            message: None,
            metric: Some(metric),
        }
    }

    pub fn failure(
        constraint: impl Into<String>,
        message: impl Into<String>,
        metric: Option<Metric>,
    ) -> Self {
        Self {
            constraint: constraint.into(),
            status: ConstraintStatus::Failure,
            message: Some(message.into()),
            metric,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConstraintStatus::Success
    }
}

fn serialize_metric<S: Serializer>(metric: &Option<Metric>, serializer: S) -> Result<S::Ok, S::Error> {
    metric.as_ref().map(MetricRecord::from).serialize(serializer)
}

/// A pure test over the metrics of one analysis run.
///
/// Evaluation never fails: every problem becomes a failed [`ConstraintResult`].
pub trait Constraint: Debug + Send + Sync {
    /// Display name used in results.
    fn name(&self) -> String;

    /// The analyzer whose metric this constraint needs.
    fn analyzer(&self) -> &Analyzer;

    fn evaluate(&self, context: &AnalyzerContext) -> ConstraintResult;
}

/// Type alias for a shared constraint.
pub type SharedConstraint = Arc<dyn Constraint>;

/// Applies an assertion to the metric of one analyzer.
#[derive(Debug, Clone)]
pub struct AnalysisBasedConstraint {
    analyzer: Analyzer,
    assertion: Assertion,
    hint: Option<String>,
}

impl AnalysisBasedConstraint {
    pub fn new(analyzer: impl Into<Analyzer>, assertion: Assertion, hint: Option<String>) -> Self {
        Self {
            analyzer: analyzer.into(),
            assertion,
            hint,
        }
    }

    pub fn assertion(&self) -> &Assertion {
        &self.assertion
    }

    fn evaluate_named(&self, name: String, context: &AnalyzerContext) -> ConstraintResult {
        let Some(metric) = context.metric(&self.analyzer) else {
            return ConstraintResult::failure(name, MISSING_ANALYSIS_MESSAGE, None);
        };

        let value = match &metric.value {
            Ok(value) => *value,
            Err(e) => return ConstraintResult::failure(name, e.to_string(), Some(metric.clone())),
        };

        match self.assertion.evaluate(value) {
            Ok(true) => ConstraintResult::success(name, metric.clone()),
            Ok(false) => {
                let mut message = format!("Value {value} does not meet the constraint requirement.");
                if let Some(hint) = &self.hint {
                    message.push(' ');
                    message.push_str(hint);
                }
                debug!(constraint = %name, value, assertion = %self.assertion, "Constraint not met");
                ConstraintResult::failure(name, message, Some(metric.clone()))
            }
            Err(e) => ConstraintResult::failure(
                name,
                format!("{ASSERTION_EXCEPTION_MESSAGE}: {e}!"),
                Some(metric.clone()),
            ),
        }
    }
}

impl Constraint for AnalysisBasedConstraint {
    fn name(&self) -> String {
        format!("AnalysisBasedConstraint({}, {})", self.analyzer, self.assertion)
    }

    fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    fn evaluate(&self, context: &AnalyzerContext) -> ConstraintResult {
        self.evaluate_named(self.name(), context)
    }
}

/// An analysis-based constraint with a readable name.
#[derive(Debug, Clone)]
pub struct NamedConstraint {
    name: String,
    inner: AnalysisBasedConstraint,
}

impl NamedConstraint {
    pub fn new(name: impl Into<String>, inner: AnalysisBasedConstraint) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn inner(&self) -> &AnalysisBasedConstraint {
        &self.inner
    }
}

impl Constraint for NamedConstraint {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn analyzer(&self) -> &Analyzer {
        self.inner.analyzer()
    }

    fn evaluate(&self, context: &AnalyzerContext) -> ConstraintResult {
        self.inner.evaluate_named(self.name.clone(), context)
    }
}

impl fmt::Display for NamedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
