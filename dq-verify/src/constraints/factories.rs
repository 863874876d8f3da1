//! Named constraints for each analyzer.
//!
//! Every factory wraps an [`AnalysisBasedConstraint`] in a [`NamedConstraint`]
//! called `<Kind>Constraint(<analyzer>)`.

use std::sync::Arc;

use super::assertion::Assertion;
use super::constraint::{AnalysisBasedConstraint, NamedConstraint, SharedConstraint};
use crate::analyzers::{
    Analyzer, Completeness, Compliance, Maximum, Mean, Minimum, PatternMatch, Quantile, Size,
    StandardDeviation, Sum, Uniqueness,
};

fn named(kind: &str, analyzer: Analyzer, assertion: Assertion, hint: Option<String>) -> SharedConstraint {
    let name = format!("{kind}Constraint({analyzer})");
    Arc::new(NamedConstraint::new(
        name,
        AnalysisBasedConstraint::new(analyzer, assertion, hint),
    ))
}

pub fn size_constraint(assertion: Assertion, filter: Option<String>, hint: Option<String>) -> SharedConstraint {
    named("Size", Size::with_filter(filter).into(), assertion, hint)
}

pub fn completeness_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Completeness::new(column).with_filter(filter);
    named("Completeness", analyzer.into(), assertion, hint)
}

pub fn min_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Minimum::new(column).with_filter(filter);
    named("Minimum", analyzer.into(), assertion, hint)
}

pub fn max_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Maximum::new(column).with_filter(filter);
    named("Maximum", analyzer.into(), assertion, hint)
}

pub fn mean_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Mean::new(column).with_filter(filter);
    named("Mean", analyzer.into(), assertion, hint)
}

pub fn sum_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Sum::new(column).with_filter(filter);
    named("Sum", analyzer.into(), assertion, hint)
}

pub fn standard_deviation_constraint(
    column: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = StandardDeviation::new(column).with_filter(filter);
    named("StandardDeviation", analyzer.into(), assertion, hint)
}

pub fn quantile_constraint(
    column: &str,
    quantile: f64,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Quantile::new(column, quantile).with_filter(filter);
    named("Quantile", analyzer.into(), assertion, hint)
}

/// Fraction of rows satisfying `predicate`, reported under `name`.
pub fn compliance_constraint(
    name: &str,
    predicate: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Compliance::new(name, predicate).with_filter(filter);
    named("Compliance", analyzer.into(), assertion, hint)
}

pub fn pattern_match_constraint(
    column: &str,
    pattern: &str,
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = PatternMatch::new(column, pattern).with_filter(filter);
    named("PatternMatch", analyzer.into(), assertion, hint)
}

pub fn uniqueness_constraint(
    columns: &[&str],
    assertion: Assertion,
    filter: Option<String>,
    hint: Option<String>,
) -> SharedConstraint {
    let analyzer = Uniqueness::new(columns.iter().copied()).with_filter(filter);
    named("Uniqueness", analyzer.into(), assertion, hint)
}
