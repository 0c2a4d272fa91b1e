//! Chain two run segments and join a calibration tuple onto them.
//!
//! Run with: `cargo run --example chain_join`

use std::sync::Arc;

use arrow::array::{Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use ntup::{
    create, create_chain, create_join_from, MemDirectory, MemTuple, OpenSpec, Result,
    RowProcessor, RowProcessorExt,
};

fn segment(name: &str, run: u64, n_events: u64) -> Result<Arc<MemTuple>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("run", DataType::UInt64, false),
        Field::new("event", DataType::UInt64, false),
        Field::new("charge", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(UInt64Array::from(vec![run; n_events as usize])),
            Arc::new(UInt64Array::from((0..n_events).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                (0..n_events).map(|e| (run * 100 + e) as f64).collect::<Vec<_>>(),
            )),
        ],
    )?;
    MemTuple::from_batch(name, &batch)
}

fn calibration() -> Result<Arc<MemTuple>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("run", DataType::UInt64, false),
        Field::new("scale", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(UInt64Array::from(vec![1u64, 2])),
            Arc::new(Float64Array::from(vec![0.98, 1.02])),
        ],
    )?;
    MemTuple::from_batch("calib", &batch)
}

fn main() -> Result<()> {
    let mut dir = MemDirectory::new();
    dir.insert(segment("run1", 1, 4)?);
    dir.insert(segment("run2", 2, 3)?);
    dir.insert(calibration()?);
    let dir = Arc::new(dir);

    let data = create_chain(
        vec![
            OpenSpec::new("run1", Arc::clone(&dir)),
            OpenSpec::new("run2", Arc::clone(&dir)),
        ],
        None,
        Some("data"),
    )?;
    let calib = create(OpenSpec::new("calib", dir), None, None)?;

    let mut join = create_join_from(data, vec![calib], vec!["run".to_string()], None, None)?;

    println!("{}", join.structure());

    let mut rows = join.rows();
    while let Some(entry) = rows.next_entry()? {
        let run: u64 = entry.get("run")?;
        let event: u64 = entry.get("event")?;
        let charge: f64 = entry.get("charge")?;
        let scale: f64 = entry.get("calib.scale")?;
        println!(
            "run {run} event {event}: charge {:.1} (calibrated {:.2})",
            charge,
            charge * scale
        );
    }
    Ok(())
}
