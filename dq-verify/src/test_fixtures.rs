//! In-memory datasets shared by unit tests.

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};

use crate::data::DataFusionDataset;

async fn dataset(batch: RecordBatch) -> DataFusionDataset {
    DataFusionDataset::from_batch(batch).await.unwrap()
}

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
    dataset(batch).await
}

/// Six rows; `att1` is 1..=6, `att2` and `att3` start with three zeros.
pub async fn numeric_dataset() -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("item", DataType::Utf8, false),
        Field::new("att1", DataType::Int64, true),
        Field::new("att2", DataType::Int64, true),
        Field::new("att3", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(items(6)),
            Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6])),
            Arc::new(Int64Array::from(vec![0, 0, 0, 5, 6, 7])),
            Arc::new(Int64Array::from(vec![0, 0, 0, 4, 6, 7])),
        ],
    )
    .unwrap();
    dataset(batch).await
}

/// A single nullable string column named `value`.
pub async fn strings_dataset(values: &[Option<&str>]) -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![Field::new("value", DataType::Utf8, true)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values.to_vec()))]).unwrap();
    dataset(batch).await
}

/// A single nullable float column named `value`.
pub async fn numbers_dataset(values: &[Option<f64>]) -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![Field::new("value", DataType::Float64, true)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values.to_vec()))]).unwrap();
    dataset(batch).await
}
