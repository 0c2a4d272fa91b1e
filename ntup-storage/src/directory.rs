//! Opaque directory handles that resolve tuple names to page sources.

use std::sync::Arc;

use ntup_result::{Error, Result};
use rustc_hash::FxHashMap;

use crate::mem::{MemPageSource, MemTuple};
use crate::source::PageSource;

/// A storage handle that can open named tuples.
///
/// This is the opaque-directory form of `OpenSpec::storage`: callers pass
/// the handle instead of a filesystem path and the processor asks it for a
/// page source at attach time.
pub trait TupleDirectory {
    fn open_tuple(&self, name: &str) -> Result<Box<dyn PageSource>>;
}

/// In-memory tuple registry.
#[derive(Default)]
pub struct MemDirectory {
    tuples: FxHashMap<String, Arc<MemTuple>>,
}

impl MemDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tuple under its own name, replacing any previous one.
    pub fn insert(&mut self, tuple: Arc<MemTuple>) {
        self.tuples.insert(tuple.name().to_string(), tuple);
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

impl TupleDirectory for MemDirectory {
    fn open_tuple(&self, name: &str) -> Result<Box<dyn PageSource>> {
        let tuple = self.tuples.get(name).ok_or_else(|| {
            Error::AttachFailed(format!("tuple \"{name}\" not found in directory"))
        })?;
        Ok(Box::new(MemPageSource::new(Arc::clone(tuple))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{RecordBatch, UInt64Array};
    use arrow::datatypes::{DataType, Field as ArrowField, Schema};

    #[test]
    fn open_resolves_registered_tuples() {
        let schema = Arc::new(Schema::new(vec![ArrowField::new(
            "event",
            DataType::UInt64,
            false,
        )]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![Arc::new(UInt64Array::from(vec![7u64]))],
        )
        .unwrap();

        let mut dir = MemDirectory::new();
        dir.insert(MemTuple::from_batch("events", &batch).unwrap());

        let mut source = dir.open_tuple("events").unwrap();
        source.attach().unwrap();
        assert_eq!(source.row_count().unwrap(), 1);

        let err = dir.open_tuple("missing").unwrap_err();
        assert!(matches!(err, Error::AttachFailed(_)));
    }
}
