//! Benchmarks for shared-scan versus sequential analysis runs.

use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use criterion::{criterion_group, criterion_main, Criterion};
use dq_verify::analyzers::RunnerConfig;
use dq_verify::constraints::Assertion;
use dq_verify::core::{Check, CheckLevel, VerificationSuite};
use dq_verify::data::DataFusionDataset;
use tokio::runtime::Runtime;

/// Creates a dataset with sample data
async fn create_dataset(rows: usize) -> DataFusionDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
        Field::new("category", DataType::Utf8, true),
        Field::new("quantity", DataType::Int32, true),
    ]));

    let id_array = Int32Array::from((0..rows as i32).collect::<Vec<_>>());
    let name_array = StringArray::from((0..rows).map(|i| format!("item_{i}")).collect::<Vec<_>>());
    let value_array = Float64Array::from((0..rows).map(|i| (i as f64) * 10.5).collect::<Vec<_>>());
    let category_array = StringArray::from(
        (0..rows)
            .map(|i| (i % 10 != 0).then(|| format!("cat_{}", i % 5)))
            .collect::<Vec<_>>(),
    );
    let quantity_array = Int32Array::from(
        (0..rows)
            .map(|i| (i % 20 != 0).then_some((i % 100) as i32))
            .collect::<Vec<_>>(),
    );

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(id_array),
            Arc::new(name_array),
            Arc::new(value_array),
            Arc::new(category_array),
            Arc::new(quantity_array),
        ],
    )
    .unwrap();

    DataFusionDataset::from_batch(batch).await.unwrap()
}

fn suite(config: RunnerConfig) -> VerificationSuite {
    VerificationSuite::new()
        .with_runner_config(config)
        .add_check(
            Check::new(CheckLevel::Error, "completeness_checks")
                .is_complete("id", None)
                .is_complete("name", None)
                .is_complete("value", None)
                .has_completeness("category", Assertion::GreaterThanOrEqual(0.9), None)
                .has_completeness("quantity", Assertion::GreaterThanOrEqual(0.95), None),
        )
        .add_check(
            Check::new(CheckLevel::Warning, "statistics_checks")
                .has_min("value", Assertion::GreaterThanOrEqual(0.0), None)
                .has_max("value", Assertion::LessThan(10_000_000.0), None)
                .has_mean("value", Assertion::GreaterThan(0.0), None)
                .has_standard_deviation("value", Assertion::GreaterThan(0.0), None)
                .has_min("quantity", Assertion::GreaterThan(0.0), None)
                .has_max("quantity", Assertion::LessThan(100.0), None)
                .has_quantile("quantity", 0.5, Assertion::Between(0.0, 100.0), None),
        )
}

fn benchmark_shared_vs_sequential(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("scan_sharing");

    for rows in [1000, 10000, 100000] {
        let data = rt.block_on(create_dataset(rows));

        let shared = suite(RunnerConfig::default());
        group.bench_function(format!("shared_{rows}_rows"), |b| {
            b.iter(|| {
                let result = rt.block_on(shared.run(&data));
                std::hint::black_box(result);
            });
        });

        let sequential = suite(RunnerConfig::sequential());
        group.bench_function(format!("sequential_{rows}_rows"), |b| {
            b.iter(|| {
                let result = rt.block_on(sequential.run(&data));
                std::hint::black_box(result);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_shared_vs_sequential);
criterion_main!(benches);
