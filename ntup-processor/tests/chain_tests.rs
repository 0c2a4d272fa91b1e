//! Integration tests for chained (vertically concatenated) processors.

use std::sync::Arc;

use arrow::array::{RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use ntup_processor::{
    create, create_chain, create_chain_from, ChainProcessor, OpenSpec, RowProcessor,
    RowProcessorExt,
};
use ntup_result::Error;
use ntup_storage::{MemDirectory, MemTuple};

fn event_tuple(name: &str, values: Vec<u64>) -> Arc<MemTuple> {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "event",
        DataType::UInt64,
        false,
    )]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![Arc::new(UInt64Array::from(values))],
    )
    .unwrap();
    MemTuple::from_batch(name, &batch).unwrap()
}

fn dir_with(tuples: Vec<Arc<MemTuple>>) -> Arc<MemDirectory> {
    let mut dir = MemDirectory::new();
    for tuple in tuples {
        dir.insert(tuple);
    }
    Arc::new(dir)
}

// Two tuples A = [0..9], B = [0, 2, 4, 6, 8]: the chain has 15 rows, row 10
// reads B's first row and row 14 its last.
#[test]
fn chain_concatenates_row_ranges() {
    let dir = dir_with(vec![
        event_tuple("A", (0..10).collect()),
        event_tuple("B", vec![0, 2, 4, 6, 8]),
    ]);

    let mut chain = create_chain(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        None,
        None,
    )
    .unwrap();

    assert_eq!(chain.row_count().unwrap(), 15);

    chain.load_row(10).unwrap().unwrap();
    assert_eq!(chain.entry().get::<u64>("event").unwrap(), 0);
    chain.load_row(14).unwrap().unwrap();
    assert_eq!(chain.entry().get::<u64>("event").unwrap(), 8);
    assert_eq!(chain.load_row(15).unwrap(), None);
}

// The iterator visits rows 0..N-1 exactly once, in order, crossing the
// inner boundary transparently.
#[test]
fn chain_iteration_is_monotonic() {
    let dir = dir_with(vec![
        event_tuple("A", (0..10).collect()),
        event_tuple("B", vec![0, 2, 4, 6, 8]),
    ]);

    let mut chain = create_chain(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        None,
        None,
    )
    .unwrap();

    let mut seen = Vec::new();
    let mut rows = chain.rows();
    while let Some(entry) = rows.next_entry().unwrap() {
        seen.push(entry.get::<u64>("event").unwrap());
    }

    let mut expected: Vec<u64> = (0..10).collect();
    expected.extend([0, 2, 4, 6, 8]);
    assert_eq!(seen, expected);
    assert_eq!(chain.rows_processed(), 15);
}

// Random access into a chain agrees with loading the same local row from
// the inner tuple directly.
#[test]
fn chain_rows_match_inner_rows() {
    let sizes = [3u64, 4, 5];
    let tuples: Vec<Arc<MemTuple>> = sizes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            event_tuple(
                &format!("t{i}"),
                (0..*n).map(|v| v + 100 * i as u64).collect(),
            )
        })
        .collect();
    let dir = dir_with(tuples);

    let specs: Vec<OpenSpec> = (0..3)
        .map(|i| OpenSpec::new(format!("t{i}"), Arc::clone(&dir)))
        .collect();
    let mut chain = create_chain(specs, None, None).unwrap();
    assert_eq!(chain.row_count().unwrap(), 12);

    let mut offset = 0u64;
    for (i, n) in sizes.iter().enumerate() {
        let mut inner = create(
            OpenSpec::new(format!("t{i}"), Arc::clone(&dir)),
            None,
            None,
        )
        .unwrap();
        for m in 0..*n {
            chain.load_row(offset + m).unwrap().unwrap();
            inner.load_row(m).unwrap().unwrap();
            assert_eq!(
                chain.entry().get::<u64>("event").unwrap(),
                inner.entry().get::<u64>("event").unwrap(),
                "chain row {} vs t{i} row {m}",
                offset + m
            );
            assert_eq!(chain.current_inner_index(), i);
        }
        offset += n;
    }
}

// Chains compose: a chain of processors may itself contain a chain.
#[test]
fn chains_nest() {
    let dir = dir_with(vec![
        event_tuple("A", vec![1, 2]),
        event_tuple("B", vec![3]),
        event_tuple("C", vec![4, 5]),
    ]);

    let inner_chain = create_chain(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", Arc::clone(&dir)),
        ],
        None,
        None,
    )
    .unwrap();
    let single = create(OpenSpec::new("C", dir), None, None).unwrap();

    let mut outer = create_chain_from(vec![inner_chain, single], None, None).unwrap();
    assert_eq!(outer.row_count().unwrap(), 5);

    let mut seen = Vec::new();
    let mut rows = outer.rows();
    while let Some(entry) = rows.next_entry().unwrap() {
        seen.push(entry.get::<u64>("event").unwrap());
    }
    assert_eq!(seen, [1, 2, 3, 4, 5]);
}

#[test]
fn empty_chain_is_rejected() {
    let err = ChainProcessor::from_specs(vec![], None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    let err = ChainProcessor::from_processors(vec![], None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

// The chain takes its name from the first inner unless told otherwise.
#[test]
fn chain_name_defaults_to_first_inner() {
    let dir = dir_with(vec![event_tuple("A", vec![1])]);
    let chain = create_chain(vec![OpenSpec::new("A", Arc::clone(&dir))], None, None).unwrap();
    assert_eq!(chain.name(), "A");

    let named = create_chain(vec![OpenSpec::new("A", dir)], None, Some("all")).unwrap();
    assert_eq!(named.name(), "all");
}
