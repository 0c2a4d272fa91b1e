//! Page source over an Arrow IPC file.
//!
//! Path-based `OpenSpec` storage resolves here: the file is read into a
//! [`MemTuple`] on attach and served through the in-memory source. All
//! encoding is the `arrow` crate's own IPC format.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::ipc::reader::FileReader;
use ntup_result::{Error, Result};
use ntup_types::{FieldId, RowId};
use tracing::debug;

use crate::descriptor::TupleDescriptor;
use crate::mem::{MemPageSource, MemTuple};
use crate::source::{ColumnReader, PageSource};

pub struct IpcFilePageSource {
    tuple_name: String,
    path: PathBuf,
    inner: Option<MemPageSource>,
}

impl IpcFilePageSource {
    pub fn new(tuple_name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            tuple_name: tuple_name.to_string(),
            path: path.into(),
            inner: None,
        }
    }

    fn inner(&self) -> Result<&MemPageSource> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Internal("page source not attached".to_string()))
    }
}

impl PageSource for IpcFilePageSource {
    fn attach(&mut self) -> Result<()> {
        if self.inner.is_some() {
            return Ok(());
        }
        let path = self.path.display();
        let file = File::open(&self.path)
            .map_err(|e| Error::AttachFailed(format!("{path}: {e}")))?;
        let reader = FileReader::try_new(file, None)
            .map_err(|e| Error::AttachFailed(format!("{path}: {e}")))?;
        let schema = reader.schema();
        let batches = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::AttachFailed(format!("{path}: {e}")))?;
        let tuple = MemTuple::from_batches(&self.tuple_name, schema, &batches)?;
        debug!(tuple = %self.tuple_name, %path, rows = tuple.n_rows(), "read IPC file");

        let mut inner = MemPageSource::new(tuple);
        inner.attach()?;
        self.inner = Some(inner);
        Ok(())
    }

    fn row_count(&self) -> Result<RowId> {
        self.inner()?.row_count()
    }

    fn descriptor(&self) -> Result<Arc<TupleDescriptor>> {
        self.inner()?.descriptor()
    }

    fn reader(&self, id: FieldId) -> Result<Box<dyn ColumnReader>> {
        self.inner()?.reader(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{RecordBatch, UInt64Array};
    use arrow::datatypes::{DataType, Field as ArrowField, Schema};
    use arrow::ipc::writer::FileWriter;
    use ntup_types::{FieldKind, Value};

    #[test]
    fn round_trips_through_ipc_file() {
        let schema = Arc::new(Schema::new(vec![ArrowField::new(
            "event",
            DataType::UInt64,
            false,
        )]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![Arc::new(UInt64Array::from(vec![10u64, 20, 30]))],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.arrow");
        {
            let file = File::create(&path).unwrap();
            let mut writer = FileWriter::try_new(file, &schema).unwrap();
            writer.write(&batch).unwrap();
            writer.finish().unwrap();
        }

        let mut source = IpcFilePageSource::new("events", &path);
        source.attach().unwrap();
        source.attach().unwrap();
        assert_eq!(source.row_count().unwrap(), 3);

        let desc = source.descriptor().unwrap();
        let reader = source.reader(desc.find_field("event").unwrap()).unwrap();
        let mut value = Value::default_of(FieldKind::U64);
        reader.read(2, &mut value).unwrap();
        assert_eq!(value, Value::U64(30));
    }

    #[test]
    fn missing_file_fails_attach() {
        let mut source = IpcFilePageSource::new("events", "/nonexistent/events.arrow");
        assert!(matches!(source.attach(), Err(Error::AttachFailed(_))));
    }
}
