//! # dq-verify - Declarative data quality verification
//!
//! dq-verify computes data quality metrics over tabular data and evaluates
//! user-declared constraints against them. Data is queried through
//! [DataFusion](https://datafusion.apache.org/), so anything that can be
//! registered as a DataFusion table can be verified.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dq_verify::prelude::*;
//!
//! # async fn example() -> dq_verify::Result<()> {
//! let data = DataFusionDataset::from_csv("orders.csv").await?;
//!
//! let result = VerificationSuite::on_data(&data)
//!     .add_check(
//!         Check::new(CheckLevel::Error, "order integrity")
//!             .has_size(Assertion::GreaterThan(0.0), None)
//!             .is_complete("order_id", None)
//!             .is_unique("order_id", None)
//!             .is_contained_in_range("discount", 0.0, 1.0, true, true, None)?,
//!     )
//!     .add_check(
//!         Check::new(CheckLevel::Warning, "shipping")
//!             .has_completeness("tracking_code", Assertion::GreaterThanOrEqual(0.95), None)
//!             .with_filter("status = 'shipped'"),
//!     )
//!     .run()
//!     .await;
//!
//! for check in &result.check_results {
//!     for failure in check.failures() {
//!         println!("{}: {:?}", failure.constraint, failure.message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## How a run works
//!
//! 1. Every check lists the analyzers its constraints need. Identical
//!    analyzers requested by several checks are computed once.
//! 2. The [`AnalysisRunner`](analyzers::AnalysisRunner) validates each
//!    analyzer's preconditions against the schema, then merges the
//!    aggregations of all scan-shareable analyzers with the same filter into a
//!    single query.
//! 3. Constraints evaluate assertions over the resulting metrics. Failures at
//!    any stage are reported as data, never raised.
//!
//! ## Architecture
//!
//! - **`data`**: the [`Dataset`](data::Dataset) abstraction and its DataFusion implementation
//! - **`analyzers`**: metric computations, their states and the scan-sharing runner
//! - **`constraints`**: assertions and constraints over metrics
//! - **`core`**: checks, the verification suite and results
//! - **`metrics`**: metric values scoped to an entity
//! - **`logging`**: logging configuration

pub mod analyzers;
pub mod constraints;
pub mod core;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod prelude;

pub use error::{Result, VerifyError};

#[cfg(test)]
mod test_fixtures;
