//! ntup: columnar tuple processing.
//!
//! This crate is the entrypoint for the ntup toolkit. It re-exports the
//! public surface of the underlying `ntup-*` crates so applications see a
//! single interface for opening tuples, composing them, and iterating the
//! result.
//!
//! # What ntup Does
//!
//! A *tuple* is a columnar container of rows with a fixed schema. ntup lets
//! a caller iterate rows that are spread across many tuples by composing
//! them behind a single row source:
//!
//! - **Chains** concatenate tuples vertically: rows `0..N` of the chain run
//!   through the inner tuples end-to-end, with inner row counts fetched
//!   lazily as iteration walks forward.
//! - **Joins** match one or more auxiliary tuples to a primary
//!   horizontally. An aligned join pairs equal row numbers; a keyed join
//!   builds a [`ntup_index::Index`] per auxiliary over the join fields and
//!   selects the first matching auxiliary row for each primary row. A
//!   missed lookup marks the entry invalid rather than failing, so
//!   consumers can distinguish a missing match from the end of the data.
//!
//! Every processor materializes rows into an [`Entry`]: an ordered buffer
//! of named, typed value slots behind shared cells. Composed processors
//! rebind their inner entries' slots into the outer entry, so one read
//! lands every field where the caller looks for it.
//!
//! # Crate Topology
//!
//! - [`ntup_types`]: the closed scalar type set, runtime values, ids.
//! - [`ntup_model`]: schema trees and frozen read models.
//! - [`ntup_storage`]: page sources over in-memory Arrow arrays and Arrow
//!   IPC files, plus opaque directory handles.
//! - [`ntup_index`]: scalar hashing, the combined-key fold, and the
//!   multi-field row index.
//! - [`ntup_processor`]: single/chain/join processors, entries, and the
//!   row iteration façade.
//! - [`ntup_result`]: the unified error type.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use arrow::array::{RecordBatch, UInt64Array};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use ntup::{create, MemDirectory, MemTuple, OpenSpec, RowProcessorExt};
//!
//! fn main() -> ntup::Result<()> {
//!     let schema = Arc::new(Schema::new(vec![Field::new(
//!         "event",
//!         DataType::UInt64,
//!         false,
//!     )]));
//!     let batch = RecordBatch::try_new(
//!         Arc::clone(&schema),
//!         vec![Arc::new(UInt64Array::from(vec![1u64, 2, 3]))],
//!     )
//!     .unwrap();
//!
//!     let mut dir = MemDirectory::new();
//!     dir.insert(MemTuple::from_batch("events", &batch)?);
//!
//!     let mut processor = create(
//!         OpenSpec::new("events", Arc::new(dir)),
//!         None,
//!         None,
//!     )?;
//!
//!     let mut rows = processor.rows();
//!     let mut total = 0u64;
//!     while let Some(entry) = rows.next_entry()? {
//!         total += entry.get::<u64>("event")?;
//!     }
//!     assert_eq!(total, 6);
//!     Ok(())
//! }
//! ```

pub use ntup_index::{
    combine_hash, combined_key_hash, hash_value, Index, IndexBuilder, IndexKeys, IndexOptions,
    DEFAULT_INDEX_CAPACITY,
};
pub use ntup_model::{FieldDef, FieldType, Model};
pub use ntup_processor::{
    create, create_chain, create_chain_from, create_join, create_join_from, ChainProcessor,
    Entry, EntryToken, JoinProcessor, OpenSpec, ReadOptions, RowProcessor, RowProcessorExt,
    Rows, SingleProcessor, StorageRef, ValueCell,
};
pub use ntup_result::{Error, Result};
pub use ntup_storage::{
    ColumnReader, FieldDescriptor, IpcFilePageSource, MemDirectory, MemPageSource, MemTuple,
    PageSource, TupleDescriptor, TupleDirectory,
};
pub use ntup_types::{FieldId, FieldKind, FromValue, RowId, Value};
