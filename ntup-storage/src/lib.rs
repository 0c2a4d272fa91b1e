//! Storage backends for ntup processors.
//!
//! The [`PageSource`] trait is the seam between processors and whatever
//! holds the columnar data: an attachable handle that reports its row count,
//! exposes a [`TupleDescriptor`] for field resolution, and hands out
//! [`ColumnReader`]s that materialize one field value at a given row.
//!
//! Two implementations ship here: [`MemPageSource`] over in-memory Arrow
//! arrays (struct columns appear as record fields), and
//! [`IpcFilePageSource`], which reads an Arrow IPC file into memory on
//! attach. [`TupleDirectory`] is the opaque handle form of storage, with
//! [`MemDirectory`] as the in-memory registry implementation.

pub mod descriptor;
pub mod directory;
pub mod ipc;
pub mod mem;
pub mod source;

pub use descriptor::{FieldDescriptor, TupleDescriptor};
pub use directory::{MemDirectory, TupleDirectory};
pub use ipc::IpcFilePageSource;
pub use mem::{MemPageSource, MemTuple};
pub use source::{ColumnReader, PageSource};
