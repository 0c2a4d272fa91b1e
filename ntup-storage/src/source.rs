//! The page source seam between processors and backing storage.

use std::sync::Arc;

use ntup_result::Result;
use ntup_types::{FieldId, FieldKind, RowId, Value};

use crate::descriptor::TupleDescriptor;

/// Materializes one field's value at a given row.
///
/// A reader is produced by [`PageSource::reader`] once a field has been
/// resolved; it stays wired to the source for the processor's lifetime.
pub trait ColumnReader {
    /// Scalar kind of the column this reader serves.
    fn kind(&self) -> FieldKind;

    /// Read the value at `row` into `dst`, replacing its contents.
    fn read(&self, row: RowId, dst: &mut Value) -> Result<()>;
}

impl std::fmt::Debug for dyn ColumnReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnReader").field("kind", &self.kind()).finish()
    }
}

/// An attachable columnar container of rows with a fixed schema.
///
/// `attach` is idempotent; `row_count`, `descriptor`, and `reader` are only
/// valid on an attached source. A page source is exclusively owned by its
/// processor (or index build) for its entire lifetime.
pub trait PageSource {
    /// Open the backing storage. Safe to call repeatedly.
    fn attach(&mut self) -> Result<()>;

    /// Number of rows in the tuple.
    fn row_count(&self) -> Result<RowId>;

    /// Shared read-only schema handle.
    fn descriptor(&self) -> Result<Arc<TupleDescriptor>>;

    /// Wire the field identified by `id` to the source, so reads can
    /// materialize it.
    fn reader(&self, id: FieldId) -> Result<Box<dyn ColumnReader>>;
}

impl std::fmt::Debug for dyn PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSource").finish()
    }
}
