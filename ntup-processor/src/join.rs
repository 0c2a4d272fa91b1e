//! Horizontal composition of a primary and auxiliary processors.

use ntup_index::{Index, IndexBuilder, IndexOptions};
use ntup_model::Model;
use ntup_result::{Error, Result};
use ntup_types::{RowId, Value};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::entry::{Entry, EntryToken};
use crate::processor::RowProcessor;

/// Maximum number of join fields.
pub const MAX_JOIN_FIELDS: usize = 4;

#[derive(Debug)]
struct AuxiliaryProcessor {
    processor: Box<dyn RowProcessor>,
    /// Built lazily on the first indexed row load.
    index: Option<Index>,
}

/// Matches auxiliary tuples to a primary, row by row.
///
/// With an empty join-field list the join is *aligned*: auxiliary row `n`
/// pairs with primary row `n`. With join fields, each auxiliary gets its
/// own [`Index`] over those fields, built on the first row load, and the
/// primary's key values select the auxiliary row.
///
/// The primary always drives the row count. A primary row whose keys match
/// no auxiliary row is still emitted, with the entry marked invalid, so
/// consumers can tell a missing match from the end of the data.
#[derive(Debug)]
pub struct JoinProcessor {
    name: String,
    model: Model,
    entry: Entry,
    primary: Box<dyn RowProcessor>,
    auxiliaries: Vec<AuxiliaryProcessor>,
    join_fields: Vec<String>,
    key_tokens: Vec<EntryToken>,
    indices_built: bool,
    n_rows: Option<RowId>,
    current_row: RowId,
    rows_processed: u64,
}

fn validate_join_fields(join_fields: &[String]) -> Result<()> {
    if join_fields.len() > MAX_JOIN_FIELDS {
        return Err(Error::TooManyJoinFields(join_fields.len()));
    }
    let mut seen = FxHashSet::default();
    for field in join_fields {
        if !seen.insert(field.as_str()) {
            return Err(Error::DuplicateJoinField(field.clone()));
        }
    }
    Ok(())
}

impl JoinProcessor {
    /// Start a join around `primary`. Auxiliaries are attached with
    /// [`add_auxiliary`](Self::add_auxiliary).
    ///
    /// A user model overrides the join's base model (it must name the join
    /// fields for an indexed join); otherwise the primary's model is
    /// cloned. The name defaults to the primary's name.
    pub fn new(
        primary: Box<dyn RowProcessor>,
        join_fields: Vec<String>,
        model: Option<Model>,
        name: Option<&str>,
    ) -> Result<Self> {
        validate_join_fields(&join_fields)?;

        let mut model = model.unwrap_or_else(|| primary.model().clone());
        model.freeze();
        let entry = Entry::from_model(&model)?;
        let name = name.unwrap_or(primary.name()).to_string();

        let mut join = Self {
            name,
            model,
            entry,
            primary,
            auxiliaries: Vec::new(),
            join_fields,
            key_tokens: Vec::new(),
            indices_built: false,
            n_rows: None,
            current_row: 0,
            rows_processed: 0,
        };
        join.rewire()?;
        Ok(join)
    }

    /// Attach one auxiliary processor.
    ///
    /// The auxiliary's top-level fields are wrapped in a record named after
    /// the auxiliary and grafted into the join model, accessible as
    /// `aux_name.field`. A `model` override restricts which of the
    /// auxiliary's fields are grafted.
    ///
    /// Fails with `NameCollision` when the auxiliary's name is already
    /// taken in the join model, and with `AddAuxAfterStart` once any row
    /// has been loaded.
    pub fn add_auxiliary(
        &mut self,
        auxiliary: Box<dyn RowProcessor>,
        model: Option<&Model>,
    ) -> Result<()> {
        if self.rows_processed > 0 {
            return Err(Error::AddAuxAfterStart);
        }

        let aux_name = auxiliary.name().to_string();
        let members = model
            .unwrap_or_else(|| auxiliary.model())
            .top_level_fields()
            .to_vec();

        self.model.unfreeze();
        let grafted = self.model.graft_record(&aux_name, members);
        self.model.freeze();
        grafted?;

        // The model changed shape, so the entry is rebuilt and everything
        // is rebound to it.
        self.entry = Entry::from_model(&self.model)?;
        self.auxiliaries.push(AuxiliaryProcessor {
            processor: auxiliary,
            index: None,
        });
        self.rewire()
    }

    /// Rebind the primary and every auxiliary into the current entry and
    /// re-resolve the join-field tokens.
    fn rewire(&mut self) -> Result<()> {
        for field in &self.join_fields {
            self.entry.add_field(&self.model, field);
            self.primary.add_field_to_entry(field)?;
        }

        self.primary.set_entry_pointers(&self.entry, None)?;
        for aux in &mut self.auxiliaries {
            let aux_name = aux.processor.name().to_string();
            aux.processor
                .set_entry_pointers(&self.entry, Some(&aux_name))?;
        }

        self.key_tokens = self
            .join_fields
            .iter()
            .map(|field| self.entry.token(field))
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// Build one index per auxiliary over the join fields.
    fn build_indices(&mut self) -> Result<()> {
        for aux in &mut self.auxiliaries {
            if aux.index.is_some() {
                continue;
            }
            let capacity = aux.processor.join_index_capacity();
            let mut builder =
                IndexBuilder::new(self.join_fields.clone(), IndexOptions { capacity });
            aux.processor.add_to_join_index(&mut builder, 0)?;
            let index = builder.finish();
            debug!(
                join = %self.name,
                auxiliary = %aux.processor.name(),
                entries = index.len(),
                "built join index"
            );
            aux.index = Some(index);
        }
        self.indices_built = true;
        Ok(())
    }
}

impl RowProcessor for JoinProcessor {
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
        let n_rows = self.primary.row_count()?;
        self.n_rows = Some(n_rows);
        Ok(n_rows)
    }

    fn load_row(&mut self, row: RowId) -> Result<Option<RowId>> {
        if self.primary.load_row(row)?.is_none() {
            return Ok(None);
        }
        self.entry.set_valid(true);

        if self.join_fields.is_empty() {
            // Aligned join: auxiliary row number equals primary row number.
            for aux in &mut self.auxiliaries {
                if aux.processor.load_row(row)?.is_none() {
                    self.entry.set_valid(false);
                }
            }
        } else {
            if !self.indices_built {
                self.build_indices()?;
            }
            let keys: Vec<Value> = self
                .key_tokens
                .iter()
                .map(|token| self.entry.cell_at(*token).borrow().clone())
                .collect();
            for aux in &mut self.auxiliaries {
                let found = match &aux.index {
                    Some(index) => index.first_entry(&keys)?,
                    None => {
                        return Err(Error::Internal(
                            "join index missing after build".to_string(),
                        ))
                    }
                };
                match found {
                    Some(aux_row) => {
                        aux.processor.load_row(aux_row)?;
                    }
                    None => self.entry.set_valid(false),
                }
            }
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
        // Inners follow transitively: rebinding them into this entry now
        // lands them in the outer cells installed above.
        self.primary.set_entry_pointers(&self.entry, None)?;
        for aux in &mut self.auxiliaries {
            let aux_name = aux.processor.name().to_string();
            aux.processor
                .set_entry_pointers(&self.entry, Some(&aux_name))?;
        }
        Ok(())
    }

    fn add_field_to_entry(&mut self, qualified_name: &str) -> Result<()> {
        self.entry.add_field(&self.model, qualified_name);

        for aux in &mut self.auxiliaries {
            let aux_prefix = format!("{}.", aux.processor.name());
            if let Some(inner_name) = qualified_name.strip_prefix(&aux_prefix) {
                return aux.processor.add_field_to_entry(inner_name);
            }
        }
        self.primary.add_field_to_entry(qualified_name)
    }

    fn add_to_join_index(&mut self, builder: &mut IndexBuilder, offset: RowId) -> Result<()> {
        self.primary.add_to_join_index(builder, offset)
    }

    fn join_index_capacity(&self) -> usize {
        self.primary.join_index_capacity()
    }

    fn structure(&self) -> String {
        let columns: Vec<Vec<String>> = std::iter::once(self.primary.structure())
            .chain(self.auxiliaries.iter().map(|aux| aux.processor.structure()))
            .map(|rendered| rendered.lines().map(str::to_string).collect())
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .map(|lines| lines.first().map(String::len).unwrap_or(0))
            .collect();
        let height = columns.iter().map(Vec::len).max().unwrap_or(0);

        let mut out = String::new();
        for row in 0..height {
            let mut line = String::new();
            for (column, width) in columns.iter().zip(&widths) {
                if !line.is_empty() {
                    line.push(' ');
                }
                match column.get(row) {
                    Some(text) => line.push_str(text),
                    None => line.push_str(&" ".repeat(*width)),
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
