//! Tuple processors: composable row sources over columnar storage.
//!
//! A processor wraps one or more tuples and exposes them as a single row
//! source with a shared [`Entry`] buffer:
//!
//! - [`SingleProcessor`] reads one tuple through its page source.
//! - [`ChainProcessor`] concatenates inner processors vertically: row
//!   numbers run `0..Σ row_count` across the inners in order.
//! - [`JoinProcessor`] matches auxiliary tuples to a primary horizontally,
//!   either aligned by row number or through a per-auxiliary
//!   [`ntup_index::Index`] over the join fields.
//!
//! Iteration goes through [`Rows`], a lending iterator yielding the
//! processor's entry for rows `0, 1, 2, ...` until exhaustion.

pub mod chain;
pub mod entry;
pub mod factory;
pub mod join;
pub mod processor;
pub mod single;
pub mod spec;

pub use chain::ChainProcessor;
pub use entry::{Entry, EntryToken, ValueCell};
pub use factory::{create, create_chain, create_chain_from, create_join, create_join_from};
pub use join::JoinProcessor;
pub use processor::{RowProcessor, RowProcessorExt, Rows};
pub use single::SingleProcessor;
pub use spec::{OpenSpec, ReadOptions, StorageRef};
