//! Constraints evaluate assertions over computed metrics.

mod assertion;
mod constraint;
mod factories;

pub use assertion::Assertion;
pub use constraint::{
    AnalysisBasedConstraint, Constraint, ConstraintResult, ConstraintStatus, NamedConstraint,
    SharedConstraint, ASSERTION_EXCEPTION_MESSAGE, MISSING_ANALYSIS_MESSAGE,
};
pub use factories::{
    completeness_constraint, compliance_constraint, max_constraint, mean_constraint,
    min_constraint, pattern_match_constraint, quantile_constraint, size_constraint,
    standard_deviation_constraint, sum_constraint, uniqueness_constraint,
};
