//! The heterogeneous row buffer shared by processors and their callers.

use std::cell::RefCell;
use std::rc::Rc;

use ntup_model::{FieldType, Model};
use ntup_result::{Error, Result};
use ntup_storage::ColumnReader;
use ntup_types::{FieldKind, FromValue, RowId, Value};
use rustc_hash::FxHashMap;

/// Shared handle to one value slot's backing store.
///
/// Rebinding a slot to another entry's cell makes that entry the sink for
/// every subsequent read of the slot; this is how chain and join processors
/// drain inner reads into their outer entry.
pub type ValueCell = Rc<RefCell<Value>>;

/// Stable opaque handle to one entry field, dense in the entry's field set.
///
/// Tokens are cheaper than name lookups on hot paths (join key collection
/// resolves its fields to tokens once). A token stays valid for the
/// lifetime of the entry it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryToken(usize);

#[derive(Debug)]
struct EntrySlot {
    qualified_name: String,
    kind: FieldKind,
    cell: ValueCell,
    reader: Option<Box<dyn ColumnReader>>,
}

/// Ordered map from qualified leaf-field name to a typed value slot.
///
/// Record fields of the model are flattened to their scalar leaves at
/// construction, so every slot is addressable by its dot-joined path.
/// The `valid` flag distinguishes a join miss from ordinary rows; end of
/// data is signaled by `load_row`, never through the entry.
#[derive(Debug)]
pub struct Entry {
    slots: Vec<EntrySlot>,
    by_name: FxHashMap<String, usize>,
    valid: bool,
}

impl Entry {
    /// Allocate an entry with one slot per scalar leaf of `model`.
    pub fn from_model(model: &Model) -> Result<Self> {
        if !model.is_frozen() {
            return Err(Error::invalid_argument(
                "model must be frozen before creating an entry",
            ));
        }
        let mut entry = Self {
            slots: Vec::new(),
            by_name: FxHashMap::default(),
            valid: true,
        };
        for (qualified_name, kind) in model.leaf_fields() {
            entry.push_slot(qualified_name, kind);
        }
        Ok(entry)
    }

    fn push_slot(&mut self, qualified_name: String, kind: FieldKind) {
        if self.by_name.contains_key(&qualified_name) {
            return;
        }
        self.by_name
            .insert(qualified_name.clone(), self.slots.len());
        self.slots.push(EntrySlot {
            qualified_name,
            kind,
            cell: Rc::new(RefCell::new(Value::default_of(kind))),
            reader: None,
        });
    }

    /// Whether a slot named `qualified_name` exists.
    pub fn has(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    /// Add the field (or, for records, its scalar leaves) to this entry.
    ///
    /// Idempotent; names the model does not know are silently ignored.
    pub fn add_field(&mut self, model: &Model, qualified_name: &str) {
        if self.has(qualified_name) {
            return;
        }
        let Some(def) = model.find(qualified_name) else {
            return;
        };
        match def.field_type() {
            FieldType::Scalar(kind) => self.push_slot(qualified_name.to_string(), *kind),
            FieldType::Record => {
                let prefix = qualified_name
                    .rsplit_once('.')
                    .map(|(head, _)| head)
                    .unwrap_or("");
                let mut leaves = Vec::new();
                def.collect_leaves(prefix, &mut leaves);
                for (name, kind) in leaves {
                    self.push_slot(name, kind);
                }
            }
            FieldType::Other(_) => {}
        }
    }

    fn slot(&self, qualified_name: &str) -> Result<&EntrySlot> {
        self.by_name
            .get(qualified_name)
            .map(|idx| &self.slots[*idx])
            .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))
    }

    /// The shared cell backing the named slot.
    pub fn cell(&self, qualified_name: &str) -> Result<ValueCell> {
        Ok(Rc::clone(&self.slot(qualified_name)?.cell))
    }

    /// Scalar kind of the named slot.
    pub fn kind_of(&self, qualified_name: &str) -> Result<FieldKind> {
        Ok(self.slot(qualified_name)?.kind)
    }

    /// Rebind the named slot to an external cell.
    ///
    /// Subsequent reads of the slot fill the external cell instead of the
    /// one allocated here.
    pub fn bind(&mut self, qualified_name: &str, cell: ValueCell) -> Result<()> {
        let idx = *self
            .by_name
            .get(qualified_name)
            .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))?;
        self.slots[idx].cell = cell;
        Ok(())
    }

    /// Wire a column reader to the named slot.
    pub(crate) fn set_reader(
        &mut self,
        qualified_name: &str,
        reader: Box<dyn ColumnReader>,
    ) -> Result<()> {
        let idx = *self
            .by_name
            .get(qualified_name)
            .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))?;
        self.slots[idx].reader = Some(reader);
        Ok(())
    }

    /// Read row `row` into every connected slot's current cell.
    pub fn read(&self, row: RowId) -> Result<()> {
        for slot in &self.slots {
            if let Some(reader) = &slot.reader {
                reader.read(row, &mut slot.cell.borrow_mut())?;
            }
        }
        Ok(())
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// False when the latest join lookup found no matching auxiliary row.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Resolve a name to its stable token.
    pub fn token(&self, qualified_name: &str) -> Result<EntryToken> {
        self.by_name
            .get(qualified_name)
            .map(|idx| EntryToken(*idx))
            .ok_or_else(|| Error::UnknownField(qualified_name.to_string()))
    }

    /// The cell behind a token obtained from this entry.
    pub fn cell_at(&self, token: EntryToken) -> ValueCell {
        Rc::clone(&self.slots[token.0].cell)
    }

    /// Typed read of the named slot's current value.
    pub fn get<T: FromValue>(&self, qualified_name: &str) -> Result<T> {
        let slot = self.slot(qualified_name)?;
        let value = slot.cell.borrow();
        T::from_value(&value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field \"{qualified_name}\" holds a {} value",
                value.kind()
            ))
        })
    }

    /// Typed read through a token.
    pub fn get_at<T: FromValue>(&self, token: EntryToken) -> Result<T> {
        let slot = &self.slots[token.0];
        let value = slot.cell.borrow();
        T::from_value(&value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field \"{}\" holds a {} value",
                slot.qualified_name,
                value.kind()
            ))
        })
    }

    /// Qualified slot names in entry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.qualified_name.as_str())
    }

    /// Iterate `(qualified_name, kind)` pairs in entry order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.slots
            .iter()
            .map(|slot| (slot.qualified_name.as_str(), slot.kind))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
