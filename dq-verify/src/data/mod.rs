//! The tabular data the engine verifies.
//!
//! Analyzers only talk to a [`Dataset`]: a read-only view over a table that
//! can be filtered, aggregated, grouped and used to evaluate boolean
//! predicates. [`DataFusionDataset`] is the implementation backed by a
//! DataFusion [`SessionContext`](datafusion::prelude::SessionContext).

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::datatypes::{DataType, SchemaRef};
use async_trait::async_trait;

use crate::analyzers::AnalyzerResult;

pub mod aggregation;
mod session;
pub mod sql;

pub use aggregation::{AggregationFunction, AggregationResult, AggregationSpec, Probability};
pub use session::{DataFusionDataset, DatasetConfig, DEFAULT_TABLE_NAME};

/// Row counts per distinct key tuple. A `None` entry is a null key value.
pub type FrequencyTable = BTreeMap<Vec<Option<String>>, u64>;

/// Read-only access to a table of named columns.
///
/// Implementations must never mutate the underlying data: filtering returns a
/// new view and every query works on the view it was called on.
#[async_trait]
pub trait Dataset: Debug + Send + Sync {
    /// Arrow schema of the table.
    fn schema(&self) -> SchemaRef;

    fn has_column(&self, name: &str) -> bool {
        self.schema().field_with_name(name).is_ok()
    }

    fn column_type(&self, name: &str) -> Option<DataType> {
        self.schema()
            .field_with_name(name)
            .ok()
            .map(|field| field.data_type().clone())
    }

    fn is_numeric(&self, name: &str) -> bool {
        self.column_type(name)
            .is_some_and(|data_type| data_type.is_numeric())
    }

    fn is_string(&self, name: &str) -> bool {
        matches!(
            self.column_type(name),
            Some(DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View)
        )
    }

    /// Returns a view containing only the rows matching `predicate`.
    fn filter_rows(&self, predicate: &str) -> Arc<dyn Dataset>;

    /// Number of rows in this view.
    async fn num_rows(&self) -> AnalyzerResult<u64>;

    /// Computes every requested aggregate in a single pass.
    async fn aggregate(&self, spec: &AggregationSpec) -> AnalyzerResult<AggregationResult>;

    /// Groups on `columns` and counts the rows per distinct key.
    async fn group_by_count(&self, columns: &[String]) -> AnalyzerResult<FrequencyTable>;

    /// Evaluates a boolean predicate per row. Null results stay null.
    async fn evaluate_expr(&self, predicate: &str) -> AnalyzerResult<BooleanArray>;
}
