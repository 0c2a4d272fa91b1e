//! Vertical concatenation of processors.

use ntup_index::{IndexBuilder, DEFAULT_INDEX_CAPACITY};
use ntup_model::Model;
use ntup_result::{Error, Result};
use ntup_types::RowId;

use crate::entry::Entry;
use crate::processor::RowProcessor;
use crate::single::SingleProcessor;
use crate::spec::OpenSpec;

/// Concatenates inner processors end-to-end.
///
/// Row numbers run `[0, Σ row_count)` across the inners in order. Inner
/// row counts are fetched lazily, so a chain over many tuples only
/// attaches the sources it actually walks past. Every inner entry is
/// rebound into the chain's outer entry at construction; whichever inner
/// serves a row writes the shared cells directly.
#[derive(Debug)]
pub struct ChainProcessor {
    name: String,
    model: Model,
    entry: Entry,
    inners: Vec<Box<dyn RowProcessor>>,
    inner_counts: Vec<Option<RowId>>,
    n_rows: Option<RowId>,
    current_inner: usize,
    current_row: RowId,
    rows_processed: u64,
}

impl ChainProcessor {
    /// Chain the tuples named by `specs`, opening one single processor per
    /// spec. A user model restricts every inner to the fields it names.
    pub fn from_specs(
        specs: Vec<OpenSpec>,
        model: Option<Model>,
        name: Option<&str>,
    ) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::invalid_argument(
                "at least one tuple must be provided",
            ));
        }
        let mut inners: Vec<Box<dyn RowProcessor>> = Vec::with_capacity(specs.len());
        for spec in specs {
            inners.push(Box::new(SingleProcessor::new(spec, model.clone(), None)?));
        }
        Self::from_processors(inners, model, name)
    }

    /// Chain existing processors. The model defaults to a clone of the
    /// first inner's; the name to the first inner's name.
    pub fn from_processors(
        mut inners: Vec<Box<dyn RowProcessor>>,
        model: Option<Model>,
        name: Option<&str>,
    ) -> Result<Self> {
        if inners.is_empty() {
            return Err(Error::invalid_argument(
                "at least one inner processor must be provided",
            ));
        }

        let mut model = model.unwrap_or_else(|| inners[0].model().clone());
        model.freeze();
        let entry = Entry::from_model(&model)?;
        let name = name.unwrap_or(inners[0].name()).to_string();

        for inner in &mut inners {
            inner.set_entry_pointers(&entry, None)?;
        }

        let inner_counts = vec![None; inners.len()];
        Ok(Self {
            name,
            model,
            entry,
            inners,
            inner_counts,
            n_rows: None,
            current_inner: 0,
            current_row: 0,
            rows_processed: 0,
        })
    }

    fn inner_count(&mut self, idx: usize) -> Result<RowId> {
        if let Some(count) = self.inner_counts[idx] {
            return Ok(count);
        }
        let count = self.inners[idx].row_count()?;
        self.inner_counts[idx] = Some(count);
        Ok(count)
    }
}

impl RowProcessor for ChainProcessor {
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
        if let Some(n_rows) = self.n_rows {
            return Ok(n_rows);
        }
        let mut n_rows = 0;
        for idx in 0..self.inners.len() {
            n_rows += self.inner_count(idx)?;
        }
        self.n_rows = Some(n_rows);
        Ok(n_rows)
    }

    fn load_row(&mut self, row: RowId) -> Result<Option<RowId>> {
        let mut local_row = row;
        let mut idx = 0;
        loop {
            if idx >= self.inners.len() {
                return Ok(None);
            }
            let count = self.inner_count(idx)?;
            if local_row < count {
                break;
            }
            local_row -= count;
            idx += 1;
        }

        self.current_inner = idx;
        if self.inners[idx].load_row(local_row)?.is_none() {
            return Err(Error::Internal(format!(
                "inner processor \"{}\" refused row {local_row} within its row count",
                self.inners[idx].name()
            )));
        }

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

    fn current_inner_index(&self) -> usize {
        self.current_inner
    }

    fn set_entry_pointers(&mut self, outer: &Entry, prefix: Option<&str>) -> Result<()> {
        let names: Vec<String> = self.entry.names().map(str::to_string).collect();
        for name in names {
            let target = match prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name.clone(),
            };
            if outer.has(&target) {
                self.entry.bind(&name, outer.cell(&target)?)?;
            }
        }
        for inner in &mut self.inners {
            inner.set_entry_pointers(outer, prefix)?;
        }
        Ok(())
    }

    fn add_field_to_entry(&mut self, qualified_name: &str) -> Result<()> {
        self.entry.add_field(&self.model, qualified_name);
        for inner in &mut self.inners {
            inner.add_field_to_entry(qualified_name)?;
        }
        Ok(())
    }

    fn add_to_join_index(&mut self, builder: &mut IndexBuilder, offset: RowId) -> Result<()> {
        let mut offset = offset;
        for idx in 0..self.inners.len() {
            let count = self.inner_count(idx)?;
            self.inners[idx].add_to_join_index(builder, offset)?;
            offset += count;
        }
        Ok(())
    }

    fn join_index_capacity(&self) -> usize {
        self.inners
            .iter()
            .map(|inner| inner.join_index_capacity())
            .min()
            .unwrap_or(DEFAULT_INDEX_CAPACITY)
    }

    fn structure(&self) -> String {
        self.inners.iter().map(|inner| inner.structure()).collect()
    }
}
