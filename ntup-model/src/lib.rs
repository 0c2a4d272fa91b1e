//! Schema model for ntup tuples.
//!
//! A [`Model`] is the frozen snapshot of the field tree a processor reads:
//! top-level fields in declaration order, record fields carrying their
//! subfields, and every leaf addressable by its dot-joined qualified name.
//! Processors clone a model on acquisition, freeze it, and allocate their
//! entry from it; join processors graft one synthetic record per auxiliary
//! into their model before freezing.

pub mod arrow_map;
pub mod field;
pub mod model;

pub use arrow_map::field_type_of;
pub use field::{FieldDef, FieldType};
pub use model::Model;
