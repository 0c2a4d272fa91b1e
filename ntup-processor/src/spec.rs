//! Open specifications: which tuple to process and where it lives.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ntup_index::DEFAULT_INDEX_CAPACITY;
use ntup_result::Result;
use ntup_storage::{IpcFilePageSource, PageSource, TupleDirectory};

/// Options applied when the tuple is read.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Cap on the size of any join index built over this tuple when it
    /// serves as an auxiliary.
    pub join_index_capacity: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            join_index_capacity: DEFAULT_INDEX_CAPACITY,
        }
    }
}

/// Where a tuple's backing storage lives.
#[derive(Clone)]
pub enum StorageRef {
    /// An Arrow IPC file on the filesystem.
    Path(PathBuf),
    /// An opaque directory handle that resolves tuple names itself.
    Directory(Arc<dyn TupleDirectory>),
}

impl fmt::Debug for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRef::Path(path) => f.debug_tuple("Path").field(path).finish(),
            StorageRef::Directory(_) => f.write_str("Directory(..)"),
        }
    }
}

impl From<PathBuf> for StorageRef {
    fn from(path: PathBuf) -> Self {
        StorageRef::Path(path)
    }
}

impl From<&Path> for StorageRef {
    fn from(path: &Path) -> Self {
        StorageRef::Path(path.to_path_buf())
    }
}

impl From<Arc<dyn TupleDirectory>> for StorageRef {
    fn from(dir: Arc<dyn TupleDirectory>) -> Self {
        StorageRef::Directory(dir)
    }
}

impl<D: TupleDirectory + 'static> From<Arc<D>> for StorageRef {
    fn from(dir: Arc<D>) -> Self {
        StorageRef::Directory(dir)
    }
}

/// Names one tuple and the storage to open it from.
#[derive(Debug, Clone)]
pub struct OpenSpec {
    pub tuple_name: String,
    pub storage: StorageRef,
    pub read_options: ReadOptions,
}

impl OpenSpec {
    pub fn new(tuple_name: impl Into<String>, storage: impl Into<StorageRef>) -> Self {
        Self {
            tuple_name: tuple_name.into(),
            storage: storage.into(),
            read_options: ReadOptions::default(),
        }
    }

    pub fn with_read_options(mut self, read_options: ReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    /// Resolve this spec to an (unattached) page source.
    pub(crate) fn create_page_source(&self) -> Result<Box<dyn PageSource>> {
        match &self.storage {
            StorageRef::Path(path) => {
                Ok(Box::new(IpcFilePageSource::new(&self.tuple_name, path)))
            }
            StorageRef::Directory(dir) => dir.open_tuple(&self.tuple_name),
        }
    }
}
