//! The multi-field row index.

use ntup_model::FieldType;
use ntup_result::{Error, Result};
use ntup_storage::PageSource;
use ntup_types::{RowId, Value};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::hash::{combine_hash, combined_key_hash, hash_value};

/// Default cap on the number of indexed entries (64 Mi).
pub const DEFAULT_INDEX_CAPACITY: usize = 1 << 26;

/// Build-time options for an index.
#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    /// Maximum number of `(key, row)` pairs the index may hold. Exceeding
    /// it during a build fails with `IndexTooLarge`.
    pub capacity: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INDEX_CAPACITY,
        }
    }
}

/// Immutable map from combined key hashes to row numbers.
///
/// Buckets preserve insertion order, which for both build paths is
/// ascending row order, so `all_entries` answers arrive sorted. Two
/// distinct key tuples that hash identically share a bucket; the index
/// does not disambiguate beyond hash equality.
#[derive(Debug)]
pub struct Index {
    field_names: Vec<String>,
    buckets: FxHashMap<u64, Vec<RowId>>,
    len: usize,
}

const EMPTY: &[RowId] = &[];

impl Index {
    /// Build an index over `field_names` from an attached (or attachable)
    /// page source.
    ///
    /// Fails with `UnknownField` for names absent from the tuple and
    /// `UnsupportedField` for fields outside the closed scalar set. After
    /// the build returns, the page source is never touched again.
    pub fn build(
        field_names: Vec<String>,
        source: &mut dyn PageSource,
        options: IndexOptions,
    ) -> Result<Self> {
        let mut builder = IndexBuilder::new(field_names, options);
        scan_into_builder(source, &mut builder, 0)?;
        Ok(builder.finish())
    }

    /// Number of key fields.
    pub fn n_fields(&self) -> usize {
        self.field_names.len()
    }

    /// Names of the key fields, in declaration order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Total number of indexed `(key, row)` pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First row number whose keys hash like `keys`, or `None`.
    pub fn first_entry(&self, keys: &[Value]) -> Result<Option<RowId>> {
        Ok(self.all_entries(keys)?.first().copied())
    }

    /// All row numbers whose keys hash like `keys`, in ascending row order.
    pub fn all_entries(&self, keys: &[Value]) -> Result<&[RowId]> {
        if keys.len() != self.field_names.len() {
            return Err(Error::ArityMismatch {
                expected: self.field_names.len(),
                actual: keys.len(),
            });
        }
        let combined = combined_key_hash(keys);
        Ok(self
            .buckets
            .get(&combined)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY))
    }

    /// By-value convenience form of [`first_entry`](Self::first_entry).
    pub fn first_entry_of<K: IndexKeys>(&self, keys: K) -> Result<Option<RowId>> {
        self.first_entry(&keys.into_values())
    }

    /// By-value convenience form of [`all_entries`](Self::all_entries).
    pub fn all_entries_of<K: IndexKeys>(&self, keys: K) -> Result<&[RowId]> {
        self.all_entries(&keys.into_values())
    }
}

/// Accumulates `(combined_hash, row)` pairs into an [`Index`].
///
/// This is the build path used by processors: a chain auxiliary walks its
/// inner processors and pushes every row with the appropriate offset, so
/// the finished index speaks the auxiliary's global row numbering.
#[derive(Debug)]
pub struct IndexBuilder {
    field_names: Vec<String>,
    buckets: FxHashMap<u64, Vec<RowId>>,
    len: usize,
    capacity: usize,
}

impl IndexBuilder {
    pub fn new(field_names: Vec<String>, options: IndexOptions) -> Self {
        Self {
            field_names,
            buckets: FxHashMap::default(),
            len: 0,
            capacity: options.capacity,
        }
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Append one pair. Fails with `IndexTooLarge` past the capacity cap.
    pub fn insert(&mut self, combined_hash: u64, row: RowId) -> Result<()> {
        if self.len >= self.capacity {
            return Err(Error::IndexTooLarge {
                capacity: self.capacity,
            });
        }
        self.buckets.entry(combined_hash).or_default().push(row);
        self.len += 1;
        Ok(())
    }

    /// Freeze into an immutable index.
    pub fn finish(self) -> Index {
        debug!(
            fields = ?self.field_names,
            entries = self.len,
            buckets = self.buckets.len(),
            "finished index build"
        );
        Index {
            field_names: self.field_names,
            buckets: self.buckets,
            len: self.len,
        }
    }
}

/// Scan every row of `source`, hashing the builder's key fields, and push
/// the pairs with row numbers offset by `offset`.
pub fn scan_into_builder(
    source: &mut dyn PageSource,
    builder: &mut IndexBuilder,
    offset: RowId,
) -> Result<()> {
    source.attach()?;
    let descriptor = source.descriptor()?;
    let n_rows = source.row_count()?;

    let mut readers = Vec::with_capacity(builder.field_names().len());
    let mut values = Vec::with_capacity(builder.field_names().len());
    for name in builder.field_names() {
        let id = descriptor
            .find_field(name)
            .ok_or_else(|| Error::UnknownField(name.clone()))?;
        let field = descriptor.field(id)?;
        let kind = match &field.field_type {
            FieldType::Scalar(kind) => *kind,
            other => return Err(Error::UnsupportedField(other.type_name().to_string())),
        };
        readers.push(source.reader(id)?);
        values.push(Value::default_of(kind));
    }

    for row in 0..n_rows {
        let mut combined = 0u64;
        for (reader, value) in readers.iter().zip(values.iter_mut()) {
            reader.read(row, value)?;
            combined = combine_hash(combined, hash_value(value));
        }
        builder.insert(combined, offset + row)?;
    }
    Ok(())
}

/// Key tuples accepted by the by-value index queries.
///
/// Implemented for every scalar type in the closed set and for tuples of up
/// to four of them, matching the join-field maximum.
pub trait IndexKeys {
    fn into_values(self) -> Vec<Value>;
}

macro_rules! impl_index_keys_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl IndexKeys for $t {
                fn into_values(self) -> Vec<Value> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_index_keys_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, char, String, &str);

macro_rules! impl_index_keys_tuple {
    ($(($($name:ident),+)),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            impl<$($name: Into<Value>),+> IndexKeys for ($($name,)+) {
                fn into_values(self) -> Vec<Value> {
                    let ($($name,)+) = self;
                    vec![$($name.into()),+]
                }
            }
        )*
    };
}

impl_index_keys_tuple!((A), (A, B), (A, B, C), (A, B, C, D));
