//! The frozen schema snapshot a processor reads from.

use ntup_result::{Error, Result};
use ntup_types::FieldKind;
use rustc_hash::FxHashMap;

use crate::field::{FieldDef, FieldType};

/// Field tree with stable top-level order and dot-joined leaf addressing.
///
/// A model starts mutable, is optionally extended (join processors graft one
/// record per auxiliary), and is then frozen. Entries may only be allocated
/// from frozen models; processors clone the model they receive so no two
/// processors alias one.
#[derive(Debug, Clone)]
pub struct Model {
    fields: Vec<FieldDef>,
    by_name: FxHashMap<String, usize>,
    frozen: bool,
}

impl Model {
    /// Build a model from top-level field definitions.
    ///
    /// Fails with `InvalidArgument` on duplicate top-level names.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let mut by_name = FxHashMap::default();
        for (idx, field) in fields.iter().enumerate() {
            if by_name.insert(field.name().to_string(), idx).is_some() {
                return Err(Error::invalid_argument(format!(
                    "duplicate top-level field \"{}\" in model",
                    field.name()
                )));
            }
        }
        Ok(Self {
            fields,
            by_name,
            frozen: false,
        })
    }

    /// Build a model directly from an Arrow schema.
    ///
    /// Fields whose storage type falls outside the closed scalar set are
    /// dropped: they cannot be read, so they have no place in a read model.
    pub fn from_arrow_schema(schema: &arrow::datatypes::Schema) -> Result<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|f| crate::arrow_map::field_def_of(f))
            .filter(|def| !matches!(def.field_type(), FieldType::Other(_)))
            .collect();
        Self::new(fields)
    }

    /// Top-level fields in declaration order.
    pub fn top_level_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Top-level field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    /// Resolve a dot-joined qualified name to its field definition.
    pub fn find(&self, qualified_name: &str) -> Option<&FieldDef> {
        let mut parts = qualified_name.split('.');
        let head = parts.next()?;
        let mut current = self.fields.get(*self.by_name.get(head)?)?;
        for part in parts {
            current = current.children().iter().find(|c| c.name() == part)?;
        }
        Some(current)
    }

    pub fn has_field(&self, qualified_name: &str) -> bool {
        self.find(qualified_name).is_some()
    }

    /// All scalar leaves as `(qualified_name, kind)`, in model order.
    pub fn leaf_fields(&self) -> Vec<(String, FieldKind)> {
        let mut out = Vec::new();
        for field in &self.fields {
            field.collect_leaves("", &mut out);
        }
        out
    }

    /// Graft a record named `name` with the given members into the model.
    ///
    /// This is how a join model absorbs an auxiliary processor's top-level
    /// fields under the auxiliary's namespace. Fails with `NameCollision`
    /// if a top-level field of that name already exists.
    pub fn graft_record(&mut self, name: &str, members: Vec<FieldDef>) -> Result<()> {
        if self.frozen {
            return Err(Error::Internal(
                "cannot graft a record into a frozen model".to_string(),
            ));
        }
        if self.by_name.contains_key(name) {
            return Err(Error::NameCollision(name.to_string()));
        }
        self.by_name.insert(name.to_string(), self.fields.len());
        self.fields.push(FieldDef::record(name, members));
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
