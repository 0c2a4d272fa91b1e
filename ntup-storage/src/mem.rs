//! In-memory tuples backed by Arrow arrays.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, RecordBatch, StringArray, StructArray, UInt16Array, UInt32Array, UInt64Array,
    UInt8Array,
};
use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use ntup_model::FieldType;
use ntup_result::{Error, Result};
use ntup_types::{FieldId, FieldKind, RowId, Value};
use tracing::debug;

use crate::descriptor::TupleDescriptor;
use crate::source::{ColumnReader, PageSource};

/// A named columnar container of rows held fully in memory.
///
/// Columns are Arrow arrays; struct columns surface as record fields with
/// their members addressable by dotted path. Tuples are immutable once
/// built and shared between page sources via `Arc`.
#[derive(Debug)]
pub struct MemTuple {
    name: String,
    schema: Arc<Schema>,
    columns: Vec<ArrayRef>,
    n_rows: RowId,
}

impl MemTuple {
    /// Build a tuple from a single record batch.
    pub fn from_batch(name: &str, batch: &RecordBatch) -> Result<Arc<Self>> {
        Self::from_batches(name, batch.schema(), std::slice::from_ref(batch))
    }

    /// Build a tuple by concatenating record batches of one schema.
    pub fn from_batches(
        name: &str,
        schema: Arc<Schema>,
        batches: &[RecordBatch],
    ) -> Result<Arc<Self>> {
        let combined = concat_batches(&schema, batches)?;
        for (field, column) in schema.fields().iter().zip(combined.columns()) {
            if column.null_count() > 0 {
                return Err(Error::invalid_argument(format!(
                    "column \"{}\" of tuple \"{name}\" contains nulls",
                    field.name()
                )));
            }
        }
        Ok(Arc::new(Self {
            name: name.to_string(),
            n_rows: combined.num_rows() as RowId,
            columns: combined.columns().to_vec(),
            schema,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn n_rows(&self) -> RowId {
        self.n_rows
    }
}

/// Page source over a [`MemTuple`].
pub struct MemPageSource {
    tuple: Arc<MemTuple>,
    descriptor: Option<Arc<TupleDescriptor>>,
}

impl MemPageSource {
    pub fn new(tuple: Arc<MemTuple>) -> Self {
        Self {
            tuple,
            descriptor: None,
        }
    }

    fn attached(&self) -> Result<&Arc<TupleDescriptor>> {
        self.descriptor
            .as_ref()
            .ok_or_else(|| Error::Internal("page source not attached".to_string()))
    }

    /// Locate the Arrow array backing a field, descending into struct
    /// columns along the dotted path.
    fn column_for(&self, qualified_name: &str) -> Result<ArrayRef> {
        let mut parts = qualified_name.split('.');
        let head = parts
            .next()
            .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))?;
        let idx = self
            .tuple
            .schema
            .index_of(head)
            .map_err(|_| Error::UnknownField(qualified_name.to_string()))?;
        let mut array = self.tuple.columns[idx].clone();
        for part in parts {
            let strukt = array
                .as_any()
                .downcast_ref::<StructArray>()
                .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))?;
            array = strukt
                .column_by_name(part)
                .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))?
                .clone();
        }
        Ok(array)
    }
}

impl PageSource for MemPageSource {
    fn attach(&mut self) -> Result<()> {
        if self.descriptor.is_some() {
            return Ok(());
        }
        let descriptor = TupleDescriptor::from_arrow_schema(&self.tuple.name, &self.tuple.schema)?;
        debug!(
            tuple = %self.tuple.name,
            rows = self.tuple.n_rows,
            fields = descriptor.n_fields(),
            "attached in-memory page source"
        );
        self.descriptor = Some(Arc::new(descriptor));
        Ok(())
    }

    fn row_count(&self) -> Result<RowId> {
        self.attached()?;
        Ok(self.tuple.n_rows)
    }

    fn descriptor(&self) -> Result<Arc<TupleDescriptor>> {
        Ok(Arc::clone(self.attached()?))
    }

    fn reader(&self, id: FieldId) -> Result<Box<dyn ColumnReader>> {
        let descriptor = Arc::clone(self.attached()?);
        let field = descriptor.field(id)?;
        let kind = match &field.field_type {
            FieldType::Scalar(kind) => *kind,
            other => return Err(Error::UnsupportedField(other.type_name().to_string())),
        };
        let array = self.column_for(&field.qualified_name)?;
        let accessor = ColumnAccessor::new(kind, &array, &field.qualified_name)?;
        Ok(Box::new(MemColumnReader {
            qualified_name: field.qualified_name.clone(),
            kind,
            accessor,
        }))
    }
}

/// Typed view of one Arrow array, downcast once at wiring time.
enum ColumnAccessor {
    Bool(BooleanArray),
    I8(Int8Array),
    I16(Int16Array),
    I32(Int32Array),
    I64(Int64Array),
    U8(UInt8Array),
    U16(UInt16Array),
    U32(UInt32Array),
    U64(UInt64Array),
    F32(Float32Array),
    F64(Float64Array),
    Utf8(StringArray),
}

macro_rules! downcast_accessor {
    ($array:expr, $name:expr, $arr_ty:ty, $variant:ident) => {{
        let typed = $array
            .as_any()
            .downcast_ref::<$arr_ty>()
            .ok_or_else(|| {
                Error::Internal(format!(
                    "column \"{}\" does not match its descriptor type",
                    $name
                ))
            })?
            .clone();
        ColumnAccessor::$variant(typed)
    }};
}

impl ColumnAccessor {
    fn new(kind: FieldKind, array: &ArrayRef, qualified_name: &str) -> Result<Self> {
        Ok(match kind {
            FieldKind::Bool => downcast_accessor!(array, qualified_name, BooleanArray, Bool),
            FieldKind::I8 => downcast_accessor!(array, qualified_name, Int8Array, I8),
            FieldKind::I16 => downcast_accessor!(array, qualified_name, Int16Array, I16),
            FieldKind::I32 => downcast_accessor!(array, qualified_name, Int32Array, I32),
            FieldKind::I64 => downcast_accessor!(array, qualified_name, Int64Array, I64),
            FieldKind::U8 => downcast_accessor!(array, qualified_name, UInt8Array, U8),
            FieldKind::U16 => downcast_accessor!(array, qualified_name, UInt16Array, U16),
            FieldKind::U32 => downcast_accessor!(array, qualified_name, UInt32Array, U32),
            FieldKind::U64 => downcast_accessor!(array, qualified_name, UInt64Array, U64),
            FieldKind::F32 => downcast_accessor!(array, qualified_name, Float32Array, F32),
            FieldKind::F64 => downcast_accessor!(array, qualified_name, Float64Array, F64),
            FieldKind::String => downcast_accessor!(array, qualified_name, StringArray, Utf8),
            FieldKind::Char => {
                return Err(Error::UnsupportedField(
                    "char (no columnar representation)".to_string(),
                ))
            }
        })
    }

    fn len(&self) -> usize {
        match self {
            ColumnAccessor::Bool(a) => a.len(),
            ColumnAccessor::I8(a) => a.len(),
            ColumnAccessor::I16(a) => a.len(),
            ColumnAccessor::I32(a) => a.len(),
            ColumnAccessor::I64(a) => a.len(),
            ColumnAccessor::U8(a) => a.len(),
            ColumnAccessor::U16(a) => a.len(),
            ColumnAccessor::U32(a) => a.len(),
            ColumnAccessor::U64(a) => a.len(),
            ColumnAccessor::F32(a) => a.len(),
            ColumnAccessor::F64(a) => a.len(),
            ColumnAccessor::Utf8(a) => a.len(),
        }
    }

    fn value_at(&self, row: usize) -> Value {
        match self {
            ColumnAccessor::Bool(a) => Value::Bool(a.value(row)),
            ColumnAccessor::I8(a) => Value::I8(a.value(row)),
            ColumnAccessor::I16(a) => Value::I16(a.value(row)),
            ColumnAccessor::I32(a) => Value::I32(a.value(row)),
            ColumnAccessor::I64(a) => Value::I64(a.value(row)),
            ColumnAccessor::U8(a) => Value::U8(a.value(row)),
            ColumnAccessor::U16(a) => Value::U16(a.value(row)),
            ColumnAccessor::U32(a) => Value::U32(a.value(row)),
            ColumnAccessor::U64(a) => Value::U64(a.value(row)),
            ColumnAccessor::F32(a) => Value::F32(a.value(row)),
            ColumnAccessor::F64(a) => Value::F64(a.value(row)),
            ColumnAccessor::Utf8(a) => Value::String(a.value(row).to_string()),
        }
    }
}

struct MemColumnReader {
    qualified_name: String,
    kind: FieldKind,
    accessor: ColumnAccessor,
}

impl ColumnReader for MemColumnReader {
    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn read(&self, row: RowId, dst: &mut Value) -> Result<()> {
        let idx = row as usize;
        if idx >= self.accessor.len() {
            return Err(Error::Internal(format!(
                "row {row} out of bounds for column \"{}\"",
                self.qualified_name
            )));
        }
        *dst = self.accessor.value_at(idx);
        Ok(())
    }
}
