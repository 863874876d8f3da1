//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use async_trait::async_trait;
use dq_verify::analyzers::AnalyzerResult;
use dq_verify::data::{AggregationResult, AggregationSpec, DataFusionDataset, Dataset, FrequencyTable};

fn items(n: usize) -> StringArray {
    StringArray::from((1..=n).map(|i| i.to_string()).collect::<Vec<_>>())
}

/// Twelve rows; `att1` is half complete and `att2` three quarters complete.
pub async fn missing_dataset() -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("item", DataType::Utf8, false),
        Field::new("att1", DataType::Utf8, true),
        Field::new("att2", DataType::Utf8, true),
    ]));
    let att1 = vec![
        Some("a"), Some("b"), None, Some("a"), Some("a"), None,
        None, Some("b"), Some("a"), None, None, None,
    ];
    let att2 = vec![
        Some("f"), Some("d"), Some("f"), None, Some("f"), Some("d"),
        Some("d"), None, Some("f"), None, Some("f"), Some("d"),
    ];
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(items(12)),
            Arc::new(StringArray::from(att1)),
            Arc::new(StringArray::from(att2)),
        ],
    )
    .unwrap();
    DataFusionDataset::from_batch(batch).await.unwrap()
}

/// Six rows; `att1` is 1..=6, `att2` is `0, 0, 0, 5, 6, 7`.
pub async fn numeric_dataset() -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("item", DataType::Utf8, false),
        Field::new("att1", DataType::Int64, true),
        Field::new("att2", DataType::Int64, true),
        Field::new("price", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(items(6)),
            Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6])),
            Arc::new(Int64Array::from(vec![0, 0, 0, 5, 6, 7])),
            Arc::new(Float64Array::from(vec![
                Some(9.5),
                Some(12.0),
                None,
                Some(3.25),
                Some(7.0),
                Some(11.0),
            ])),
        ],
    )
    .unwrap();
    DataFusionDataset::from_batch(batch).await.unwrap()
}

/// Five rows of product codes and emails, one missing email.
pub async fn contacts_dataset() -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new("email", DataType::Utf8, true),
        Field::new("region", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["AB1234", "CD5678", "xx0000", "EF9012", "GH3456"])),
            Arc::new(StringArray::from(vec![
                Some("ann@example.com"),
                Some("bob@example.com"),
                Some("not-an-email"),
                None,
                Some("eve@example.org"),
            ])),
            Arc::new(StringArray::from(vec!["eu", "eu", "us", "us", "apac"])),
        ],
    )
    .unwrap();
    DataFusionDataset::from_batch(batch).await.unwrap()
}

/// Counts the queries issued against a dataset and its filtered views.
#[derive(Debug, Clone)]
pub struct CountingDataset {
    inner: Arc<dyn Dataset>,
    aggregations: Arc<AtomicUsize>,
    groupings: Arc<AtomicUsize>,
}

impl CountingDataset {
    pub fn new(inner: impl Dataset + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            aggregations: Arc::new(AtomicUsize::new(0)),
            groupings: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn aggregations(&self) -> usize {
        self.aggregations.load(Ordering::SeqCst)
    }

    pub fn groupings(&self) -> usize {
        self.groupings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dataset for CountingDataset {
    fn schema(&self) -> SchemaRef {
        self.inner.schema()
    }

    fn filter_rows(&self, predicate: &str) -> Arc<dyn Dataset> {
        Arc::new(Self {
            inner: self.inner.filter_rows(predicate),
            aggregations: Arc::clone(&self.aggregations),
            groupings: Arc::clone(&self.groupings),
        })
    }

    async fn num_rows(&self) -> AnalyzerResult<u64> {
        self.inner.num_rows().await
    }

    async fn aggregate(&self, spec: &AggregationSpec) -> AnalyzerResult<AggregationResult> {
        self.aggregations.fetch_add(1, Ordering::SeqCst);
        self.inner.aggregate(spec).await
    }

    async fn group_by_count(&self, columns: &[String]) -> AnalyzerResult<FrequencyTable> {
        self.groupings.fetch_add(1, Ordering::SeqCst);
        self.inner.group_by_count(columns).await
    }

    async fn evaluate_expr(&self, predicate: &str) -> AnalyzerResult<BooleanArray> {
        self.inner.evaluate_expr(predicate).await
    }
}

/// A single nullable float column named `value`.
pub async fn numbers_dataset(values: &[Option<f64>]) -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![Field::new("value", DataType::Float64, true)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values.to_vec()))]).unwrap();
    DataFusionDataset::from_batch(batch).await.unwrap()
}
