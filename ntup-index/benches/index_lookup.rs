//! Benchmarks for index build and lookup over an in-memory tuple.

use std::sync::Arc;

use arrow::array::{RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ntup_index::{Index, IndexOptions};
use ntup_storage::{MemPageSource, MemTuple};

const N_ROWS: u64 = 100_000;

fn sample_tuple() -> Arc<MemTuple> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("run", DataType::UInt64, false),
        Field::new("event", DataType::UInt64, false),
    ]));
    let runs: Vec<u64> = (0..N_ROWS).map(|i| i / 1000).collect();
    let events: Vec<u64> = (0..N_ROWS).map(|i| i % 1000).collect();
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(UInt64Array::from(runs)),
            Arc::new(UInt64Array::from(events)),
        ],
    )
    .unwrap();
    MemTuple::from_batch("bench", &batch).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let tuple = sample_tuple();
    c.bench_function("index_build_100k_two_fields", |b| {
        b.iter(|| {
            let mut source = MemPageSource::new(Arc::clone(&tuple));
            let index = Index::build(
                vec!["run".to_string(), "event".to_string()],
                &mut source,
                IndexOptions::default(),
            )
            .unwrap();
            black_box(index.len())
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let tuple = sample_tuple();
    let mut source = MemPageSource::new(tuple);
    let index = Index::build(
        vec!["run".to_string(), "event".to_string()],
        &mut source,
        IndexOptions::default(),
    )
    .unwrap();

    c.bench_function("index_first_entry", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = (i + 1) % N_ROWS;
            black_box(index.first_entry_of((i / 1000, i % 1000)).unwrap())
        })
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
