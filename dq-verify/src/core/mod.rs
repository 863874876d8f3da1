//! Checks, verification suites and their results.

pub mod check;
pub mod level;
pub mod result;
pub mod suite;

pub use check::{Check, ConstraintFactory};
pub use level::{CheckLevel, CheckStatus};
pub use result::{CheckResult, VerificationResult};
pub use suite::{VerificationRunBuilder, VerificationSuite};
