//! Check type and fluent builder for grouping constraints.
//!
//! A [`Check`] is an ordered list of constraints with a severity level. Most
//! builder methods leave the constraint they added "pending": calling
//! [`Check::with_filter`] right after rebuilds that constraint with a row
//! filter.
//!
//! ```rust
//! use dq_verify::constraints::Assertion;
//! use dq_verify::core::{Check, CheckLevel};
//!
//! # fn main() -> dq_verify::Result<()> {
//! let check = Check::new(CheckLevel::Error, "order integrity")
//!     .has_size(Assertion::GreaterThan(0.0), None)
//!     .is_complete("order_id", None)
//!     .has_mean("amount", Assertion::Between(10.0, 500.0), None)
//!     .with_filter("status = 'shipped'")
//!     .is_contained_in_range("discount", 0.0, 1.0, true, true, None)?;
//!
//! assert_eq!(check.constraints().len(), 4);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::level::{CheckLevel, CheckStatus};
use super::result::CheckResult;
use crate::analyzers::{Analyzer, AnalyzerContext};
use crate::constraints::{
    completeness_constraint, compliance_constraint, max_constraint, mean_constraint,
    min_constraint, pattern_match_constraint, quantile_constraint, size_constraint,
    standard_deviation_constraint, sum_constraint, uniqueness_constraint, Assertion,
    SharedConstraint,
};
use crate::data::sql::{quote_identifier, quote_literal};
use crate::error::{Result, VerifyError};
use crate::logging::truncate_field;

/// Rebuilds a constraint with an optional row filter.
pub type ConstraintFactory = Arc<dyn Fn(Option<String>) -> SharedConstraint + Send + Sync>;

/// A named, leveled group of constraints.
#[derive(Clone)]
pub struct Check {
    level: CheckLevel,
    description: String,
    constraints: Vec<SharedConstraint>,
    pending: Option<ConstraintFactory>,
}

impl Check {
    pub fn new(level: CheckLevel, description: impl Into<String>) -> Self {
        Self {
            level,
            description: description.into(),
            constraints: Vec::new(),
            pending: None,
        }
    }

    pub fn level(&self) -> CheckLevel {
        self.level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn constraints(&self) -> &[SharedConstraint] {
        &self.constraints
    }

    /// Adds a constraint that cannot be filtered afterwards.
    pub fn add_constraint(mut self, constraint: SharedConstraint) -> Self {
        self.constraints.push(constraint);
        self.pending = None;
        self
    }

    fn add_filterable_constraint<F>(mut self, factory: F) -> Self
    where
        F: Fn(Option<String>) -> SharedConstraint + Send + Sync + 'static,
    {
        let factory: ConstraintFactory = Arc::new(factory);
        self.constraints.push(factory(None));
        self.pending = Some(factory);
        self
    }

    /// Restricts the most recently added constraint to rows matching `filter`.
    ///
    /// Only the constraint added by the immediately preceding builder call can
    /// be filtered; anywhere else this logs a warning and leaves the check as is.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        match self.pending.take() {
            Some(factory) => {
                debug!(check = %self.description, filter = %truncate_field(&filter, 256), "Filtering last constraint");
                self.constraints.pop();
                self.constraints.push(factory(Some(filter)));
            }
            None => {
                warn!(
                    check = %self.description,
                    filter = %truncate_field(&filter, 256),
                    "with_filter called without a filterable constraint; ignoring"
                );
            }
        }
        self
    }

    /// Asserts on the number of rows.
    pub fn has_size(self, assertion: Assertion, hint: Option<String>) -> Self {
        self.add_filterable_constraint(move |filter| {
            size_constraint(assertion.clone(), filter, hint.clone())
        })
    }

    pub fn has_min(self, column: impl Into<String>, assertion: Assertion, hint: Option<String>) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            min_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    pub fn has_max(self, column: impl Into<String>, assertion: Assertion, hint: Option<String>) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            max_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts that a column has no null values.
    pub fn is_complete(self, column: impl Into<String>, hint: Option<String>) -> Self {
        self.has_completeness(column, Assertion::Equals(1.0), hint)
    }

    /// Asserts on the fraction of non-null values in a column.
    pub fn has_completeness(
        self,
        column: impl Into<String>,
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            completeness_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    pub fn has_mean(self, column: impl Into<String>, assertion: Assertion, hint: Option<String>) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            mean_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts on the population standard deviation of a column.
    pub fn has_standard_deviation(
        self,
        column: impl Into<String>,
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            standard_deviation_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    pub fn has_sum(self, column: impl Into<String>, assertion: Assertion, hint: Option<String>) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            sum_constraint(&column, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts on the `quantile` quantile of a column, `quantile` in `[0, 1]`.
    ///
    /// An out of range quantile is reported as a failed metric at run time.
    pub fn has_quantile(
        self,
        column: impl Into<String>,
        quantile: f64,
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let column = column.into();
        self.add_filterable_constraint(move |filter| {
            quantile_constraint(&column, quantile, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts on the fraction of rows for which the SQL `predicate` holds.
    pub fn satisfies(
        self,
        predicate: impl Into<String>,
        name: impl Into<String>,
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let predicate = predicate.into();
        let name = name.into();
        self.add_filterable_constraint(move |filter| {
            compliance_constraint(&name, &predicate, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts on the fraction of non-null string values matching `pattern`.
    pub fn has_pattern(
        self,
        column: impl Into<String>,
        pattern: impl Into<String>,
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let column = column.into();
        let pattern = pattern.into();
        self.add_filterable_constraint(move |filter| {
            pattern_match_constraint(&column, &pattern, assertion.clone(), filter, hint.clone())
        })
    }

    /// Asserts that a column holds no negative values. Nulls comply.
    pub fn is_non_negative(self, column: &str, assertion: Assertion, hint: Option<String>) -> Self {
        let predicate = format!("COALESCE({}, 0) >= 0", quote_identifier(column));
        self.satisfies(predicate, format!("{column} is non-negative"), assertion, hint)
    }

    /// Asserts that a column holds only positive values. Nulls comply.
    pub fn is_positive(self, column: &str, assertion: Assertion, hint: Option<String>) -> Self {
        let predicate = format!("COALESCE({}, 1.0) > 0", quote_identifier(column));
        self.satisfies(predicate, format!("{column} is positive"), assertion, hint)
    }

    /// Asserts that every non-null value of `column` is one of `allowed_values`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Configuration`] when `allowed_values` is empty.
    pub fn is_contained_in(
        self,
        column: &str,
        allowed_values: &[&str],
        assertion: Assertion,
        hint: Option<String>,
    ) -> Result<Self> {
        if allowed_values.is_empty() {
            return Err(VerifyError::configuration(format!(
                "Empty list of allowed values used for column {column}"
            )));
        }

        let quoted = quote_identifier(column);
        let values = allowed_values
            .iter()
            .map(|v| quote_literal(v))
            .collect::<Vec<_>>()
            .join(", ");
        let predicate = format!("{quoted} IS NULL OR {quoted} IN ({values})");
        let name = format!("{column} contained in [{}]", allowed_values.join(", "));
        Ok(self.satisfies(predicate, name, assertion, hint))
    }

    /// Asserts that every non-null value of `column` lies in the given interval.
    ///
    /// An infinite bound leaves that side of the interval open. NaN bounds are
    /// rejected.
    pub fn is_contained_in_range(
        self,
        column: &str,
        lower_bound: f64,
        upper_bound: f64,
        include_lower_bound: bool,
        include_upper_bound: bool,
        hint: Option<String>,
    ) -> Result<Self> {
        if lower_bound.is_nan() || upper_bound.is_nan() {
            return Err(VerifyError::configuration(format!(
                "Range bounds for column {column} must not be NaN"
            )));
        }

        let quoted = quote_identifier(column);
        let mut comparisons = Vec::with_capacity(2);
        if lower_bound.is_finite() {
            let op = if include_lower_bound { ">=" } else { ">" };
            comparisons.push(format!("{quoted} {op} {lower_bound:?}"));
        } else if lower_bound == f64::INFINITY {
            comparisons.push("FALSE".to_string());
        }
        if upper_bound.is_finite() {
            let op = if include_upper_bound { "<=" } else { "<" };
            comparisons.push(format!("{quoted} {op} {upper_bound:?}"));
        } else if upper_bound == f64::NEG_INFINITY {
            comparisons.push("FALSE".to_string());
        }

        if comparisons.is_empty() {
            comparisons.push("TRUE".to_string());
        }
        let predicate = format!("{quoted} IS NULL OR ({})", comparisons.join(" AND "));
        let name = format!("{column} between {lower_bound} and {upper_bound}");
        Ok(self.satisfies(predicate, name, Assertion::Equals(1.0), hint))
    }

    /// Asserts that every value of `column` occurs exactly once.
    pub fn is_unique(self, column: impl Into<String>, hint: Option<String>) -> Self {
        let column: String = column.into();
        self.has_uniqueness(&[column], Assertion::Equals(1.0), hint)
    }

    /// Asserts on the fraction of rows whose combination of `columns` is unique.
    pub fn has_uniqueness<S: AsRef<str>>(
        self,
        columns: &[S],
        assertion: Assertion,
        hint: Option<String>,
    ) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self.add_filterable_constraint(move |filter| {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            uniqueness_constraint(&columns, assertion.clone(), filter, hint.clone())
        })
    }

    /// Distinct analyzers needed to evaluate this check, in declaration order.
    pub fn required_analyzers(&self) -> Vec<Analyzer> {
        let mut seen = HashSet::new();
        self.constraints
            .iter()
            .map(|c| c.analyzer())
            .filter(|a| seen.insert((*a).clone()))
            .cloned()
            .collect()
    }

    /// Evaluates every constraint against computed metrics.
    pub fn evaluate(&self, context: &AnalyzerContext) -> CheckResult {
        let constraint_results: Vec<_> = self.constraints.iter().map(|c| c.evaluate(context)).collect();

        let status = if constraint_results.iter().all(|r| r.is_success()) {
            CheckStatus::Success
        } else {
            CheckStatus::from(self.level)
        };

        CheckResult {
            description: self.description.clone(),
            level: self.level,
            status,
            constraint_results,
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("level", &self.level)
            .field("description", &self.description)
            .field("constraints", &self.constraints)
            .field("filterable", &self.pending.is_some())
            .finish()
    }
}
