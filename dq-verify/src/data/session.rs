//! DataFusion-backed [`Dataset`] implementation.

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, RecordBatch};
use arrow::compute::{cast, concat};
use arrow::datatypes::{DataType, Float64Type, SchemaRef, UInt64Type};
use arrow::util::display::array_value_to_string;
use async_trait::async_trait;
use datafusion::execution::context::{SessionConfig, SessionContext};
use datafusion::prelude::CsvReadOptions;
use datafusion::sql::TableReference;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::sql::{conjunction, null_if_nan, quote_identifier};
use super::{AggregationFunction, AggregationResult, AggregationSpec, Dataset, FrequencyTable};
use crate::analyzers::{AnalyzerError, AnalyzerResult};
use crate::error::{Result, VerifyError};

/// Table name used when a dataset registers its own data.
pub const DEFAULT_TABLE_NAME: &str = "data";

const COUNT_ALIAS: &str = "__dq_count";
const PREDICATE_ALIAS: &str = "__dq_predicate";

/// Session settings for datasets that create their own [`SessionContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Batch size for query execution
    pub batch_size: usize,
    /// Target number of partitions for parallel execution
    pub target_partitions: usize,
    /// Name the data is registered under
    pub table_name: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_target_partitions(mut self, target_partitions: usize) -> Self {
        self.target_partitions = target_partitions.max(1);
        self
    }

    fn session_context(&self) -> SessionContext {
        let config = SessionConfig::new()
            .with_batch_size(self.batch_size)
            .with_target_partitions(self.target_partitions);
        SessionContext::new_with_config(config)
    }
}

/// A table registered in a DataFusion session, optionally narrowed by filters.
///
/// Filters are kept as SQL predicates and ANDed into the `WHERE` clause of
/// every query, so filtering never copies or mutates the registered table.
///
/// # Examples
///
/// ```rust,ignore
/// use dq_verify::data::{DataFusionDataset, Dataset};
///
/// # async fn example(batch: arrow::array::RecordBatch) -> dq_verify::Result<()> {
/// let data = DataFusionDataset::from_batch(batch).await?;
/// let recent = data.filter_rows("year >= 2020");
/// println!("{} rows", recent.num_rows().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DataFusionDataset {
    ctx: SessionContext,
    table: String,
    schema: SchemaRef,
    filters: Vec<String>,
}

impl fmt::Debug for DataFusionDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFusionDataset")
            .field("table", &self.table)
            .field("filters", &self.filters)
            .field("columns", &self.schema.fields().len())
            .finish()
    }
}

impl DataFusionDataset {
    /// Wraps a table that is already registered in `ctx`.
    pub async fn new(ctx: SessionContext, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let provider = ctx
            .table_provider(TableReference::bare(table.as_str()))
            .await
            .map_err(|_| VerifyError::TableNotFound {
                table: table.clone(),
            })?;
        Ok(Self {
            schema: provider.schema(),
            ctx,
            table,
            filters: Vec::new(),
        })
    }

    /// Registers an in-memory batch in a fresh session.
    pub async fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::from_batch_with_config(batch, &DatasetConfig::default()).await
    }

    pub async fn from_batch_with_config(batch: RecordBatch, config: &DatasetConfig) -> Result<Self> {
        let ctx = config.session_context();
        ctx.register_batch(config.table_name.as_str(), batch)?;
        Self::new(ctx, config.table_name.clone()).await
    }

    /// Registers a CSV file (with header row) in a fresh session.
    pub async fn from_csv(path: &str) -> Result<Self> {
        let config = DatasetConfig::default();
        let ctx = config.session_context();
        ctx.register_csv(config.table_name.as_str(), path, CsvReadOptions::new())
            .await?;
        Self::new(ctx, config.table_name).await
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Row filters applied to this view, in the order they were added.
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    fn from_clause(&self) -> String {
        let table = quote_identifier(&self.table);
        match conjunction(&self.filters) {
            Some(predicate) => format!("FROM {table} WHERE {predicate}"),
            None => format!("FROM {table}"),
        }
    }

    fn is_floating(&self, column: &str) -> bool {
        self.schema
            .field_with_name(column)
            .is_ok_and(|field| field.data_type().is_floating())
    }

    async fn query(&self, sql: &str) -> AnalyzerResult<Vec<RecordBatch>> {
        debug!(sql = %sql, "Executing dataset query");
        let batches = self.ctx.sql(sql).await?.collect().await?;
        Ok(batches)
    }
}

#[async_trait]
impl Dataset for DataFusionDataset {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn filter_rows(&self, predicate: &str) -> Arc<dyn Dataset> {
        let mut filtered = self.clone();
        filtered.filters.push(predicate.to_string());
        Arc::new(filtered)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn num_rows(&self) -> AnalyzerResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS {} {}",
            quote_identifier(COUNT_ALIAS),
            self.from_clause()
        );
        let batches = self.query(&sql).await?;
        let batch = single_row(&batches)?;
        Ok(float_at(batch.column(0))?.map_or(0, |rows| rows as u64))
    }

    #[instrument(skip(self, spec), fields(table = %self.table, aggregates = spec.len()))]
    async fn aggregate(&self, spec: &AggregationSpec) -> AnalyzerResult<AggregationResult> {
        let mut result = AggregationResult::new();
        if spec.is_empty() {
            return Ok(result);
        }

        let mut selections = Vec::with_capacity(spec.len());
        let mut requested = Vec::with_capacity(spec.len());
        for (column, function) in spec.iter() {
            let alias = format!("agg_{}", requested.len());
            let mut input = quote_identifier(column);
            if function.skips_nan() && self.is_floating(column) {
                input = null_if_nan(&input);
            }
            let expr = function.to_sql(&input)?;
            selections.push(format!("{expr} AS {}", quote_identifier(&alias)));
            requested.push((alias, function.clone(), column.to_string()));
        }

        let sql = format!("SELECT {} {}", selections.join(", "), self.from_clause());
        let batches = self.query(&sql).await?;
        let batch = single_row(&batches)?;

        for (alias, function, column) in requested {
            let array = batch.column_by_name(&alias).ok_or_else(|| {
                AnalyzerError::invalid_data(format!("Aggregation output {alias} is missing"))
            })?;
            let value = match &function {
                AggregationFunction::Quantile(q) => nearest_rank(array, q.value())?,
                _ => float_at(array)?,
            };
            result.insert(function, column, value);
        }
        Ok(result)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn group_by_count(&self, columns: &[String]) -> AnalyzerResult<FrequencyTable> {
        let keys = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {keys}, COUNT(*) AS {} {} GROUP BY {keys}",
            quote_identifier(COUNT_ALIAS),
            self.from_clause()
        );
        let batches = self.query(&sql).await?;

        let mut frequencies = FrequencyTable::new();
        for batch in &batches {
            let counts = cast(batch.column(columns.len()), &DataType::UInt64)?;
            let counts = counts.as_primitive::<UInt64Type>();
            for row in 0..batch.num_rows() {
                let key = (0..columns.len())
                    .map(|i| string_at(batch.column(i), row))
                    .collect::<AnalyzerResult<Vec<_>>>()?;
                *frequencies.entry(key).or_insert(0) += counts.value(row);
            }
        }
        Ok(frequencies)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn evaluate_expr(&self, predicate: &str) -> AnalyzerResult<BooleanArray> {
        let sql = format!(
            "SELECT ({predicate}) AS {} {}",
            quote_identifier(PREDICATE_ALIAS),
            self.from_clause()
        );
        debug!(sql = %sql, "Evaluating predicate");
        let df = self.ctx.sql(&sql).await?;
        let data_type = df.schema().field(0).data_type().clone();
        if data_type != DataType::Boolean {
            return Err(AnalyzerError::invalid_data(format!(
                "Predicate '{predicate}' evaluates to {data_type}, expected Boolean"
            )));
        }

        let batches = df.collect().await?;
        let arrays: Vec<&dyn Array> = batches.iter().map(|b| b.column(0).as_ref()).collect();
        if arrays.is_empty() {
            return Ok(BooleanArray::from(Vec::<bool>::new()));
        }
        let combined = concat(&arrays)?;
        Ok(combined.as_boolean().clone())
    }
}

fn single_row(batches: &[RecordBatch]) -> AnalyzerResult<&RecordBatch> {
    batches
        .iter()
        .find(|batch| batch.num_rows() > 0)
        .ok_or_else(|| AnalyzerError::invalid_data("Aggregation query returned no rows"))
}

fn float_at(array: &ArrayRef) -> AnalyzerResult<Option<f64>> {
    if array.is_empty() {
        return Err(AnalyzerError::invalid_data("Aggregation output is empty"));
    }
    if array.is_null(0) {
        return Ok(None);
    }
    let values = cast(array, &DataType::Float64)?;
    let values = values.as_primitive::<Float64Type>();
    Ok(values.is_valid(0).then(|| values.value(0)))
}

fn string_at(array: &ArrayRef, row: usize) -> AnalyzerResult<Option<String>> {
    if array.is_null(row) {
        return Ok(None);
    }
    Ok(Some(array_value_to_string(array, row)?))
}

/// Selects the value at rank `round_half_even(q * (n - 1))` of the sorted
/// non-null, non-NaN values, so the result is always an observed value.
fn nearest_rank(array: &ArrayRef, q: f64) -> AnalyzerResult<Option<f64>> {
    if array.is_empty() {
        return Err(AnalyzerError::invalid_data("Aggregation output is empty"));
    }
    if array.is_null(0) {
        return Ok(None);
    }
    let values = if let Some(list) = array.as_list_opt::<i32>() {
        list.value(0)
    } else if let Some(list) = array.as_list_opt::<i64>() {
        list.value(0)
    } else {
        return Err(AnalyzerError::invalid_data(format!(
            "Expected a list of values but found {}",
            array.data_type()
        )));
    };

    let values = cast(&values, &DataType::Float64)?;
    let mut sorted: Vec<f64> = values
        .as_primitive::<Float64Type>()
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (q * (sorted.len() - 1) as f64).round_ties_even() as usize;
    Ok(sorted.get(rank).copied())
}
