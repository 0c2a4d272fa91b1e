//! Multi-field row indexing for ntup tuples.
//!
//! An [`Index`] maps combined key hashes to the row numbers where those keys
//! occur, in insertion order, so a join processor (or any caller) can turn a
//! key tuple into a row number with one lookup. Indices are built once,
//! either directly from a page source or from pairs pushed by a processor
//! walking its own structure, and are immutable afterwards.

pub mod hash;
pub mod index;

pub use hash::{combine_hash, combined_key_hash, hash_value};
pub use index::{
    scan_into_builder, Index, IndexBuilder, IndexKeys, IndexOptions, DEFAULT_INDEX_CAPACITY,
};
