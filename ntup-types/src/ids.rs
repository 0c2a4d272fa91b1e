//! Identifiers shared across ntup crates.

/// Zero-based index of a row within one tuple or within the logical output
/// of a processor.
///
/// Row numbers are `u64` so chained tuples can address more rows than any
/// single container holds.
pub type RowId = u64;

/// Identifier of a field within one tuple descriptor.
///
/// Field ids are dense, assigned in schema declaration order when a
/// descriptor is created, and only meaningful relative to that descriptor.
pub type FieldId = u32;
