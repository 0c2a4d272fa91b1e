//! Core scalar types for the ntup toolkit.
//!
//! This crate hosts the closed scalar type set ([`FieldKind`]), the tagged
//! runtime value ([`Value`]), and the identifier aliases shared across the
//! workspace, decoupled from the schema model (`ntup-model`) and storage
//! (`ntup-storage`) crates.

pub mod ids;
pub mod kind;
pub mod value;

pub use ids::{FieldId, RowId};
pub use kind::FieldKind;
pub use value::{FromValue, Value};
