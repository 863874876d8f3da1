//! Prelude for commonly used types and traits in dq-verify.

pub use crate::analyzers::{
    AnalysisRunner, Analyzer, AnalyzerContext, AnalyzerError, Completeness, Compliance,
    ExecutionMode, Maximum, Mean, Minimum, PatternMatch, Quantile, RunnerConfig, Size,
    StandardDeviation, Sum, Uniqueness,
};
pub use crate::constraints::{Assertion, Constraint, ConstraintResult, ConstraintStatus};
pub use crate::core::{
    Check, CheckLevel, CheckResult, CheckStatus, VerificationResult, VerificationSuite,
};
pub use crate::data::{DataFusionDataset, Dataset, DatasetConfig};
pub use crate::error::{Result, VerifyError};
pub use crate::logging::LogConfig;
pub use crate::metrics::{Entity, Metric};
