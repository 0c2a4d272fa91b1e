//! Field definitions: one schema node per tuple column or record member.

use ntup_types::FieldKind;

/// The type of one schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A scalar leaf drawn from the closed hashable set.
    Scalar(FieldKind),
    /// A named substructure whose members are fields themselves. Records
    /// cannot be hashed or materialized as a single value.
    Record,
    /// A storage type outside the closed set. Such fields may exist in a
    /// tuple but cannot be read or indexed; the payload is the storage
    /// type's name for diagnostics.
    Other(String),
}

impl FieldType {
    /// Type name as rendered in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Scalar(kind) => kind.type_name(),
            FieldType::Record => "record",
            FieldType::Other(name) => name,
        }
    }

    /// The scalar kind, if this is a scalar leaf.
    pub fn scalar_kind(&self) -> Option<FieldKind> {
        match self {
            FieldType::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// One node in a model's field tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
    children: Vec<FieldDef>,
}

impl FieldDef {
    /// A scalar leaf field.
    pub fn scalar(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Scalar(kind),
            children: Vec::new(),
        }
    }

    /// A record field with the given members.
    pub fn record(name: impl Into<String>, children: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Record,
            children,
        }
    }

    pub(crate) fn new(name: String, field_type: FieldType, children: Vec<FieldDef>) -> Self {
        Self {
            name,
            field_type,
            children,
        }
    }

    /// Unqualified name of this field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn children(&self) -> &[FieldDef] {
        &self.children
    }

    /// Collect `(qualified_name, kind)` for every scalar leaf under this
    /// node, prefixing names with `prefix` when non-empty.
    pub fn collect_leaves(&self, prefix: &str, out: &mut Vec<(String, FieldKind)>) {
        let qualified = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{prefix}.{}", self.name)
        };

        match &self.field_type {
            FieldType::Scalar(kind) => out.push((qualified, *kind)),
            FieldType::Record => {
                for child in &self.children {
                    child.collect_leaves(&qualified, out);
                }
            }
            // Unreadable leaves never become entry slots.
            FieldType::Other(_) => {}
        }
    }
}
