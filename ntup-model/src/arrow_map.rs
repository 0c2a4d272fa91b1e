//! Mapping between Arrow data types and ntup field types.
//!
//! Arrow is the columnar vocabulary of the in-memory page source; the closed
//! scalar set maps one-to-one onto the corresponding Arrow primitive types,
//! `Utf8` carries strings, and `Struct` columns become records. `char` is
//! value-level only and has no Arrow column representation.

use arrow::datatypes::{DataType, Field as ArrowField};
use ntup_types::FieldKind;

use crate::field::{FieldDef, FieldType};

/// Map an Arrow data type onto a [`FieldType`].
pub fn field_type_of(data_type: &DataType) -> FieldType {
    match data_type {
        DataType::Boolean => FieldType::Scalar(FieldKind::Bool),
        DataType::Int8 => FieldType::Scalar(FieldKind::I8),
        DataType::Int16 => FieldType::Scalar(FieldKind::I16),
        DataType::Int32 => FieldType::Scalar(FieldKind::I32),
        DataType::Int64 => FieldType::Scalar(FieldKind::I64),
        DataType::UInt8 => FieldType::Scalar(FieldKind::U8),
        DataType::UInt16 => FieldType::Scalar(FieldKind::U16),
        DataType::UInt32 => FieldType::Scalar(FieldKind::U32),
        DataType::UInt64 => FieldType::Scalar(FieldKind::U64),
        DataType::Float32 => FieldType::Scalar(FieldKind::F32),
        DataType::Float64 => FieldType::Scalar(FieldKind::F64),
        DataType::Utf8 => FieldType::Scalar(FieldKind::String),
        DataType::Struct(_) => FieldType::Record,
        other => FieldType::Other(other.to_string()),
    }
}

/// Build a [`FieldDef`] from an Arrow schema field, recursing into struct
/// members.
pub fn field_def_of(field: &ArrowField) -> FieldDef {
    let field_type = field_type_of(field.data_type());
    let children = match field.data_type() {
        DataType::Struct(members) => members.iter().map(|m| field_def_of(m)).collect(),
        _ => Vec::new(),
    };
    FieldDef::new(field.name().clone(), field_type, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Fields;

    #[test]
    fn scalars_map_onto_kinds() {
        assert_eq!(
            field_type_of(&DataType::UInt64),
            FieldType::Scalar(FieldKind::U64)
        );
        assert_eq!(
            field_type_of(&DataType::Utf8),
            FieldType::Scalar(FieldKind::String)
        );
    }

    #[test]
    fn structs_become_records() {
        let members = Fields::from(vec![
            ArrowField::new("x", DataType::Float32, false),
            ArrowField::new("y", DataType::Float32, false),
        ]);
        let def = field_def_of(&ArrowField::new("pos", DataType::Struct(members), false));
        assert_eq!(*def.field_type(), FieldType::Record);
        assert_eq!(def.children().len(), 2);
        assert_eq!(def.children()[0].name(), "x");
    }

    #[test]
    fn unsupported_types_are_preserved_by_name() {
        let ft = field_type_of(&DataType::LargeUtf8);
        assert!(matches!(ft, FieldType::Other(_)));
        assert_eq!(ft.type_name(), DataType::LargeUtf8.to_string());
    }
}
