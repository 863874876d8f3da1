//! Analyzers turn a dataset into metrics.
//!
//! Each analyzer computes an intermediate [state](state) from the data and
//! derives a single [`Metric`](crate::metrics::Metric) from it. Failures are
//! captured inside the metric, so [`Analyzer::calculate`] and
//! [`AnalysisRunner::do_analysis_run`] always complete.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dq_verify::analyzers::{AnalysisRunner, Analyzer, Completeness, Quantile};
//! use dq_verify::data::DataFusionDataset;
//!
//! # async fn example(batch: arrow::array::RecordBatch) -> dq_verify::Result<()> {
//! let data = DataFusionDataset::from_batch(batch).await?;
//! let analyzers = vec![
//!     Analyzer::from(Completeness::new("email")),
//!     Analyzer::from(Quantile::new("amount", 0.95)),
//! ];
//!
//! let context = AnalysisRunner::new().do_analysis_run(&data, &analyzers).await;
//! for metric in context.success_metrics() {
//!     println!("{metric}");
//! }
//! # Ok(())
//! # }
//! ```

// Constructors and definition shared by analyzers over one numeric column.
macro_rules! numeric_column_definition {
    ($analyzer:ident, $name:literal) => {
        impl $analyzer {
            pub fn new(column: impl Into<String>) -> Self {
                Self {
                    column: column.into(),
                    filter: None,
                }
            }

            pub fn with_filter(mut self, filter: Option<String>) -> Self {
                self.filter = filter;
                self
            }
        }

        impl AnalyzerDefinition for $analyzer {
            fn name(&self) -> &'static str {
                $name
            }

            fn instance(&self) -> String {
                self.column.clone()
            }

            fn entity(&self) -> Entity {
                Entity::Column
            }

            fn filter(&self) -> Option<&str> {
                self.filter.as_deref()
            }

            fn preconditions(&self) -> Vec<Precondition> {
                vec![
                    Precondition::has_column(&self.column),
                    Precondition::is_numeric(&self.column),
                ]
            }
        }
    };
}


pub mod advanced;
pub mod analyzer;
pub mod basic;
pub mod context;
pub mod errors;
pub mod grouped;
pub mod preconditions;
pub mod runner;
pub mod state;
pub mod traits;

pub use advanced::{Compliance, PatternMatch, Quantile, StandardDeviation};
pub use analyzer::{Analyzer, AnalyzerKey, Grouping, NonScan, ScanShareable};
pub use basic::{Completeness, Maximum, Mean, Minimum, Size, Sum};
pub use context::{AnalysisMetadata, AnalyzerContext};
pub use errors::{AnalyzerError, AnalyzerResult};
pub use grouped::Uniqueness;
pub use preconditions::{find_first_failing, Precondition};
pub use runner::{AnalysisRunner, ExecutionMode, ProgressCallback, RunnerConfig};
pub use state::{
    AnalyzerState, DoubleValuedState, FrequenciesAndNumRows, MaxState, MeanState, MinState,
    NumMatches, NumMatchesAndCount, QuantileState, StandardDeviationState, SumState,
};
pub use traits::{
    compute_frequencies, AnalyzerDefinition, GroupingAnalyzer, NonScanAnalyzer,
    ScanShareableAnalyzer,
};
