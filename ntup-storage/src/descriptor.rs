//! Tuple descriptors: the on-storage schema as a flat field table.

use arrow::datatypes::{DataType, Field as ArrowField, Schema};
use ntup_model::{field_type_of, FieldType, Model};
use ntup_result::{Error, Result};
use ntup_types::FieldId;
use rustc_hash::FxHashMap;

/// One field of an attached tuple.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub id: FieldId,
    /// Unqualified name of this field.
    pub name: String,
    /// Dot-joined path from the schema root.
    pub qualified_name: String,
    pub field_type: FieldType,
    pub parent: Option<FieldId>,
    pub children: Vec<FieldId>,
}

/// Read-only schema handle of an attached page source.
///
/// Field ids are dense and assigned in depth-first declaration order, so a
/// record field precedes its members. The descriptor describes everything
/// the storage holds, including fields outside the closed scalar set; those
/// are resolvable but not readable.
#[derive(Debug)]
pub struct TupleDescriptor {
    tuple_name: String,
    fields: Vec<FieldDescriptor>,
    by_qualified: FxHashMap<String, FieldId>,
    top_level: Vec<FieldId>,
}

impl TupleDescriptor {
    /// Build a descriptor from an Arrow schema.
    pub fn from_arrow_schema(tuple_name: &str, schema: &Schema) -> Result<Self> {
        let mut desc = Self {
            tuple_name: tuple_name.to_string(),
            fields: Vec::new(),
            by_qualified: FxHashMap::default(),
            top_level: Vec::new(),
        };
        for field in schema.fields() {
            let id = desc.insert(field, "", None)?;
            desc.top_level.push(id);
        }
        Ok(desc)
    }

    fn insert(
        &mut self,
        field: &ArrowField,
        prefix: &str,
        parent: Option<FieldId>,
    ) -> Result<FieldId> {
        let qualified_name = if prefix.is_empty() {
            field.name().clone()
        } else {
            format!("{prefix}.{}", field.name())
        };
        let id = self.fields.len() as FieldId;
        if self
            .by_qualified
            .insert(qualified_name.clone(), id)
            .is_some()
        {
            return Err(Error::invalid_argument(format!(
                "duplicate field \"{qualified_name}\" in tuple \"{}\"",
                self.tuple_name
            )));
        }
        self.fields.push(FieldDescriptor {
            id,
            name: field.name().clone(),
            qualified_name: qualified_name.clone(),
            field_type: field_type_of(field.data_type()),
            parent,
            children: Vec::new(),
        });

        if let DataType::Struct(members) = field.data_type() {
            for member in members {
                let child_id = self.insert(member, &qualified_name, Some(id))?;
                self.fields[id as usize].children.push(child_id);
            }
        }
        Ok(id)
    }

    pub fn tuple_name(&self) -> &str {
        &self.tuple_name
    }

    /// Resolve a dot-joined qualified name to its field id.
    pub fn find_field(&self, qualified_name: &str) -> Option<FieldId> {
        self.by_qualified.get(qualified_name).copied()
    }

    /// Look up a field by id.
    pub fn field(&self, id: FieldId) -> Result<&FieldDescriptor> {
        self.fields
            .get(id as usize)
            .ok_or_else(|| Error::Internal(format!("field id {id} out of range")))
    }

    /// Top-level fields in declaration order.
    pub fn top_level_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.top_level.iter().map(|id| &self.fields[*id as usize])
    }

    pub fn n_fields(&self) -> usize {
        self.fields.len()
    }

    /// Derive the read model for this tuple.
    ///
    /// Fields outside the closed scalar set are dropped from the model;
    /// they remain resolvable through the descriptor itself.
    pub fn create_model(&self) -> Result<Model> {
        let mut defs = Vec::with_capacity(self.top_level.len());
        for field in self.top_level_fields() {
            if let Some(def) = self.field_def(field) {
                defs.push(def);
            }
        }
        Model::new(defs)
    }

    fn field_def(&self, field: &FieldDescriptor) -> Option<ntup_model::FieldDef> {
        match &field.field_type {
            FieldType::Scalar(kind) => Some(ntup_model::FieldDef::scalar(&field.name, *kind)),
            FieldType::Record => {
                let members = field
                    .children
                    .iter()
                    .filter_map(|id| self.field_def(&self.fields[*id as usize]))
                    .collect();
                Some(ntup_model::FieldDef::record(&field.name, members))
            }
            FieldType::Other(_) => None,
        }
    }
}
