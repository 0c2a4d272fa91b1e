//! Processor over one tuple.

use ntup_index::{scan_into_builder, IndexBuilder};
use ntup_model::Model;
use ntup_result::{Error, Result};
use ntup_storage::PageSource;
use ntup_types::RowId;
use tracing::debug;

use crate::entry::Entry;
use crate::processor::{structure_box, RowProcessor};
use crate::spec::{OpenSpec, StorageRef};

/// Wraps one tuple: owns its page source and materializes rows into its
/// entry.
///
/// The processor starts unconnected; the first `load_row`, `row_count`, or
/// `add_to_join_index` call attaches the page source, caches the row
/// count, resolves every entry field to a descriptor field, and wires a
/// column reader per slot.
pub struct SingleProcessor {
    name: String,
    tuple_name: String,
    /// Filesystem location, when the storage has one; shown in structure
    /// diagrams.
    location: Option<String>,
    source: Box<dyn PageSource>,
    model: Model,
    entry: Entry,
    /// `Some` once connected.
    n_rows: Option<RowId>,
    current_row: RowId,
    rows_processed: u64,
    join_index_capacity: usize,
}

impl SingleProcessor {
    /// Open a processor for `spec`.
    ///
    /// Without a user model, the tuple's own descriptor provides one; a
    /// user model restricts the processor to the fields it names. The
    /// processor name defaults to the tuple name.
    pub fn new(spec: OpenSpec, model: Option<Model>, name: Option<&str>) -> Result<Self> {
        let mut source = spec.create_page_source()?;
        let location = match &spec.storage {
            StorageRef::Path(path) => Some(path.display().to_string()),
            StorageRef::Directory(_) => None,
        };
        let mut model = match model {
            Some(model) => model,
            None => {
                source.attach()?;
                source.descriptor()?.create_model()?
            }
        };
        model.freeze();
        let entry = Entry::from_model(&model)?;
        let name = name.unwrap_or(&spec.tuple_name).to_string();

        Ok(Self {
            name,
            tuple_name: spec.tuple_name,
            location,
            source,
            model,
            entry,
            n_rows: None,
            current_row: 0,
            rows_processed: 0,
            join_index_capacity: spec.read_options.join_index_capacity,
        })
    }

    /// Attach the page source and wire every entry field. Idempotent;
    /// returns the cached row count.
    fn connect(&mut self) -> Result<RowId> {
        if let Some(n_rows) = self.n_rows {
            return Ok(n_rows);
        }

        self.source.attach()?;
        let n_rows = self.source.row_count()?;
        let descriptor = self.source.descriptor()?;

        let names: Vec<String> = self.entry.names().map(str::to_string).collect();
        for name in names {
            let id = descriptor
                .find_field(&name)
                .ok_or_else(|| Error::UnknownField(name.clone()))?;
            let reader = self.source.reader(id)?;
            if reader.kind() != self.entry.kind_of(&name)? {
                return Err(Error::invalid_argument(format!(
                    "field \"{name}\" is {} in the model but {} in tuple \"{}\"",
                    self.entry.kind_of(&name)?,
                    reader.kind(),
                    self.tuple_name
                )));
            }
            self.entry.set_reader(&name, reader)?;
        }

        debug!(
            processor = %self.name,
            tuple = %self.tuple_name,
            rows = n_rows,
            fields = self.entry.len(),
            "connected single processor"
        );
        self.n_rows = Some(n_rows);
        Ok(n_rows)
    }
}

impl RowProcessor for SingleProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn entry(&self) -> &Entry {
        &self.entry
    }

    fn row_count(&mut self) -> Result<RowId> {
        self.connect()
    }

    fn load_row(&mut self, row: RowId) -> Result<Option<RowId>> {
        let n_rows = self.connect()?;
        if row >= n_rows {
            return Ok(None);
        }
        self.entry.read(row)?;
        self.rows_processed += 1;
        self.current_row = row;
        Ok(Some(row))
    }

    fn current_row(&self) -> RowId {
        self.current_row
    }

    fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    fn set_entry_pointers(&mut self, outer: &Entry, prefix: Option<&str>) -> Result<()> {
        let names: Vec<String> = self.entry.names().map(str::to_string).collect();
        for name in names {
            let target = match prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name.clone(),
            };
            // Fields the outer entry does not carry keep their own store.
            if outer.has(&target) {
                self.entry.bind(&name, outer.cell(&target)?)?;
            }
        }
        Ok(())
    }

    fn add_field_to_entry(&mut self, qualified_name: &str) -> Result<()> {
        self.entry.add_field(&self.model, qualified_name);
        Ok(())
    }

    fn add_to_join_index(&mut self, builder: &mut IndexBuilder, offset: RowId) -> Result<()> {
        self.connect()?;
        scan_into_builder(self.source.as_mut(), builder, offset)
    }

    fn join_index_capacity(&self) -> usize {
        self.join_index_capacity
    }

    fn structure(&self) -> String {
        structure_box(&self.tuple_name, self.location.as_deref())
    }
}
