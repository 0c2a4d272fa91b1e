//! Integration tests for join processors.

use std::f32::consts::PI;
use std::sync::Arc;

use arrow::array::{Float32Array, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use ntup_processor::{
    create, create_chain, create_join, create_join_from, JoinProcessor, OpenSpec, ReadOptions,
    RowProcessor, RowProcessorExt,
};
use ntup_result::Error;
use ntup_storage::{MemDirectory, MemTuple};

fn u64_tuple(name: &str, field: &str, values: Vec<u64>) -> Arc<MemTuple> {
    let schema = Arc::new(Schema::new(vec![Field::new(
        field,
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

fn event_x_tuple(name: &str, events: Vec<u64>, xs: Vec<f32>) -> Arc<MemTuple> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("event", DataType::UInt64, false),
        Field::new("x", DataType::Float32, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(UInt64Array::from(events)),
            Arc::new(Float32Array::from(xs)),
        ],
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

// Keyed join: primary events [0..9], auxiliary events {0, 2, 4, 6, 8} with
// x = i/π. Even primary rows pick up the matching auxiliary row; odd rows
// are emitted invalid.
#[test]
fn keyed_join_selects_matching_rows() {
    ntup_test_utils::init_tracing_for_tests();

    let dir = dir_with(vec![
        u64_tuple("A", "event", (0..10).collect()),
        event_x_tuple(
            "B",
            (0..5).map(|i| i * 2).collect(),
            (0..5).map(|i| i as f32 / PI).collect(),
        ),
    ]);

    let mut join = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    assert_eq!(join.row_count().unwrap(), 10);

    for n in 0..10u64 {
        join.load_row(n).unwrap().unwrap();
        let entry = join.entry();
        assert_eq!(entry.get::<u64>("event").unwrap(), n);
        if n % 2 == 0 {
            assert!(entry.is_valid(), "row {n}");
            assert_eq!(entry.get::<f32>("B.x").unwrap(), (n / 2) as f32 / PI);
            assert_eq!(entry.get::<u64>("B.event").unwrap(), n);
        } else {
            assert!(!entry.is_valid(), "row {n}");
        }
    }
    assert_eq!(join.load_row(10).unwrap(), None);
}

// Aligned join (no keys): auxiliary row n pairs with primary row n; rows
// past the auxiliary's end are emitted invalid.
#[test]
fn aligned_join_pairs_by_row_number() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", (0..10).collect()),
        event_x_tuple(
            "B",
            vec![100, 101, 102, 103, 104],
            vec![0.0, 0.1, 0.2, 0.3, 0.4],
        ),
    ]);

    let mut join = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        vec![],
        None,
        None,
    )
    .unwrap();

    let mut n = 0u64;
    let mut rows = join.rows();
    while let Some(entry) = rows.next_entry().unwrap() {
        assert_eq!(entry.get::<u64>("event").unwrap(), n);
        if n < 5 {
            assert!(entry.is_valid());
            assert_eq!(entry.get::<u64>("B.event").unwrap(), 100 + n);
        } else {
            assert!(!entry.is_valid());
        }
        n += 1;
    }
    assert_eq!(n, 10, "join output is as long as the primary");
}

// With duplicate keys in the auxiliary, the first matching row wins.
#[test]
fn keyed_join_picks_first_duplicate() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", vec![7]),
        event_x_tuple("B", vec![7, 7, 7], vec![1.0, 2.0, 3.0]),
    ]);

    let mut join = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    join.load_row(0).unwrap().unwrap();
    assert!(join.entry().is_valid());
    assert_eq!(join.entry().get::<f32>("B.x").unwrap(), 1.0);
}

// The join model wraps every auxiliary's top-level fields in a record
// named after the auxiliary; primary fields stay unshadowed.
#[test]
fn join_model_namespaces_auxiliaries() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", vec![0, 1]),
        event_x_tuple("B", vec![0, 1], vec![0.5, 1.5]),
    ]);

    let join = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", dir),
        ],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    let model = join.model();
    assert!(model.has_field("event"));
    assert!(model.has_field("B.event"));
    assert!(model.has_field("B.x"));
    assert!(!model.has_field("B.event.x"));

    let names: Vec<&str> = join.entry().names().collect();
    assert_eq!(names, ["event", "B.event", "B.x"]);
}

// Several auxiliaries, each with its own index; a row is valid only when
// every auxiliary has a match.
#[test]
fn multi_auxiliary_join_tracks_validity_per_row() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", (0..7).collect()),
        event_x_tuple(
            "B",
            vec![0, 2, 4, 6],
            vec![0.0, 2.0, 4.0, 6.0],
        ),
        event_x_tuple("C", vec![0, 3, 6], vec![0.0, 30.0, 60.0]),
    ]);

    let mut join = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", Arc::clone(&dir)),
            OpenSpec::new("C", dir),
        ],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    for n in 0..7u64 {
        join.load_row(n).unwrap().unwrap();
        let valid = n % 2 == 0 && n % 3 == 0;
        assert_eq!(join.entry().is_valid(), valid, "row {n}");
        if valid {
            assert_eq!(join.entry().get::<f32>("B.x").unwrap(), n as f32);
            assert_eq!(join.entry().get::<f32>("C.x").unwrap(), n as f32 * 10.0);
        }
    }
}

// A chain can serve as the auxiliary: its rows contribute to the join
// index sequentially, offset by the inners before them.
#[test]
fn chain_auxiliary_contributes_offset_rows() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", (0..10).collect()),
        event_x_tuple("B1", vec![0, 2], vec![0.0, 1.0]),
        event_x_tuple("B2", vec![4, 6, 8], vec![2.0, 3.0, 4.0]),
    ]);

    let primary = create(OpenSpec::new("A", Arc::clone(&dir)), None, None).unwrap();
    let aux = create_chain(
        vec![
            OpenSpec::new("B1", Arc::clone(&dir)),
            OpenSpec::new("B2", dir),
        ],
        None,
        Some("B"),
    )
    .unwrap();

    let mut join = create_join_from(
        primary,
        vec![aux],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    for n in 0..10u64 {
        join.load_row(n).unwrap().unwrap();
        if n % 2 == 0 {
            assert!(join.entry().is_valid(), "row {n}");
            // x was laid out as event/2 across both chained tuples.
            assert_eq!(join.entry().get::<f32>("B.x").unwrap(), (n / 2) as f32);
        } else {
            assert!(!join.entry().is_valid(), "row {n}");
        }
    }
}

// The structure diagram stacks chained tuples and places join columns side
// by side.
#[test]
fn structure_renders_composition() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", vec![0]),
        event_x_tuple("B1", vec![0], vec![0.0]),
        event_x_tuple("B2", vec![0], vec![0.0]),
    ]);

    let primary = create(OpenSpec::new("A", Arc::clone(&dir)), None, None).unwrap();
    let aux = create_chain(
        vec![
            OpenSpec::new("B1", Arc::clone(&dir)),
            OpenSpec::new("B2", dir),
        ],
        None,
        Some("B"),
    )
    .unwrap();
    let join =
        create_join_from(primary, vec![aux], vec!["event".to_string()], None, None).unwrap();

    let structure = join.structure();
    let lines: Vec<&str> = structure.lines().collect();

    // One box is four lines; the chained auxiliary stacks two boxes next
    // to the primary's single box.
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("+---"));
    assert_eq!(lines[0].matches('+').count(), 4, "two boxes side by side");
    assert!(lines[1].contains("| A"));
    assert!(lines[1].contains("| B1"));
    assert!(lines[5].contains("| B2"));
    assert!(!lines[5].contains("| A"));
}

#[test]
fn join_field_preconditions_are_enforced() {
    let dir = dir_with(vec![u64_tuple("A", "event", vec![0])]);
    let fields = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let primary = || create(OpenSpec::new("A", Arc::clone(&dir)), None, None).unwrap();

    let err = JoinProcessor::new(
        primary(),
        fields(&["a", "b", "c", "d", "e"]),
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::TooManyJoinFields(5)));

    let err =
        JoinProcessor::new(primary(), fields(&["run", "run"]), None, None).unwrap_err();
    assert!(matches!(err, Error::DuplicateJoinField(name) if name == "run"));

    // Join fields must exist in the join model.
    let err = JoinProcessor::new(primary(), fields(&["missing"]), None, None).unwrap_err();
    assert!(matches!(err, Error::UnknownField(name) if name == "missing"));
}

#[test]
fn auxiliary_name_collisions_are_rejected() {
    // Primary has a top-level field named "B".
    let schema = Arc::new(Schema::new(vec![
        Field::new("event", DataType::UInt64, false),
        Field::new("B", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(UInt64Array::from(vec![0u64])),
            Arc::new(Float64Array::from(vec![1.0])),
        ],
    )
    .unwrap();
    let dir = dir_with(vec![
        MemTuple::from_batch("A", &batch).unwrap(),
        event_x_tuple("B", vec![0], vec![0.0]),
        event_x_tuple("C", vec![0], vec![0.0]),
    ]);

    let err = create_join(
        vec![
            OpenSpec::new("A", Arc::clone(&dir)),
            OpenSpec::new("B", Arc::clone(&dir)),
        ],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::NameCollision(name) if name == "B"));

    // Two auxiliaries with the same processor name collide as well.
    let primary = create(OpenSpec::new("C", Arc::clone(&dir)), None, None).unwrap();
    let aux1 = create(OpenSpec::new("B", Arc::clone(&dir)), None, None).unwrap();
    let aux2 = create(OpenSpec::new("B", dir), None, None).unwrap();
    let err = create_join_from(
        primary,
        vec![aux1, aux2],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::NameCollision(name) if name == "B"));
}

#[test]
fn auxiliaries_cannot_be_added_after_processing_starts() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", vec![0, 1]),
        event_x_tuple("B", vec![0], vec![0.0]),
    ]);

    let primary = create(OpenSpec::new("A", Arc::clone(&dir)), None, None).unwrap();
    let mut join =
        JoinProcessor::new(primary, vec!["event".to_string()], None, None).unwrap();

    join.load_row(0).unwrap().unwrap();

    let aux = create(OpenSpec::new("B", dir), None, None).unwrap();
    let err = join.add_auxiliary(aux, None).unwrap_err();
    assert!(matches!(err, Error::AddAuxAfterStart));
}

// A join index larger than the auxiliary's configured capacity fails on
// the first keyed row load.
#[test]
fn undersized_join_index_capacity_fails() {
    let dir = dir_with(vec![
        u64_tuple("A", "event", vec![0]),
        event_x_tuple(
            "B",
            (0..5).collect(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
        ),
    ]);

    let aux_spec = OpenSpec::new("B", Arc::clone(&dir)).with_read_options(ReadOptions {
        join_index_capacity: 2,
    });
    let mut join = create_join(
        vec![OpenSpec::new("A", dir), aux_spec],
        vec!["event".to_string()],
        None,
        None,
    )
    .unwrap();

    let err = join.load_row(0).unwrap_err();
    assert!(matches!(err, Error::IndexTooLarge { capacity: 2 }));
}
