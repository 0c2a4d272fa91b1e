//! The processor trait and the row iteration façade.

use ntup_index::{IndexBuilder, DEFAULT_INDEX_CAPACITY};
use ntup_model::Model;
use ntup_result::Result;
use ntup_types::RowId;

use crate::entry::Entry;

/// A row source over one or more tuples.
///
/// Implemented by single, chain, and join processors; compositions own
/// their inner processors as trait objects. Loading past the last row
/// returns `Ok(None)`; every other failure is a typed error.
pub trait RowProcessor {
    /// Processor name, used for join namespacing and diagnostics.
    fn name(&self) -> &str;

    /// The frozen schema this processor reads.
    fn model(&self) -> &Model;

    /// The entry filled by `load_row`.
    fn entry(&self) -> &Entry;

    /// Total number of rows. Connects lazily on first use.
    fn row_count(&mut self) -> Result<RowId>;

    /// Load the row identified by `row`.
    ///
    /// Returns `Ok(Some(row))` when the row was loaded, `Ok(None)` when
    /// `row` is past the end.
    fn load_row(&mut self, row: RowId) -> Result<Option<RowId>>;

    /// The row number most recently loaded.
    fn current_row(&self) -> RowId;

    /// Total number of rows loaded so far.
    fn rows_processed(&self) -> u64;

    /// Index of the inner processor currently being read.
    ///
    /// Only meaningful for chains; other processors report 0.
    fn current_inner_index(&self) -> usize {
        0
    }

    /// Rebind every slot of this processor's entry to the matching
    /// (optionally `prefix.`-qualified) slot of `outer`, so reads drain
    /// into the outer entry. Names absent from `outer` keep their own
    /// backing store.
    fn set_entry_pointers(&mut self, outer: &Entry, prefix: Option<&str>) -> Result<()>;

    /// Ensure `qualified_name` is part of this processor's entry (and of
    /// the inner processor that serves it).
    fn add_field_to_entry(&mut self, qualified_name: &str) -> Result<()>;

    /// Publish every row's combined key hash into `builder`, with row
    /// numbers offset by `offset`.
    ///
    /// A chain contributes its inners sequentially, each offset by the
    /// total row count of the inners before it.
    fn add_to_join_index(&mut self, builder: &mut IndexBuilder, offset: RowId) -> Result<()>;

    /// Cap for join indices built over this processor as an auxiliary.
    fn join_index_capacity(&self) -> usize {
        DEFAULT_INDEX_CAPACITY
    }

    /// Render the processor composition as an ASCII diagram.
    ///
    /// Chains stack their inner tuples vertically; joins place the primary
    /// and its auxiliaries side by side.
    fn structure(&self) -> String;
}

impl std::fmt::Debug for dyn RowProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowProcessor").field("name", &self.name()).finish()
    }
}

/// Box width used by [`RowProcessor::structure`] renderings.
pub(crate) const STRUCTURE_BOX_WIDTH: usize = 32;

/// One tuple box for a structure diagram: the tuple name over its storage
/// location (blank for opaque directory handles), truncated to fit.
pub(crate) fn structure_box(tuple_name: &str, location: Option<&str>) -> String {
    let inner = STRUCTURE_BOX_WIDTH - 4;
    let truncate = |text: &str| -> String {
        if text.chars().count() <= inner {
            text.to_string()
        } else {
            let head: String = text.chars().take(inner - 2).collect();
            format!("{head}..")
        }
    };

    let border = format!("+{}+\n", "-".repeat(STRUCTURE_BOX_WIDTH - 2));
    let name = truncate(tuple_name);
    let location = truncate(location.unwrap_or(""));
    format!(
        "{border}| {name:<inner$} |\n| {location:<inner$} |\n{border}",
        inner = inner
    )
}

/// Forward iterator over a processor's rows.
///
/// `next_entry` visits rows `0, 1, 2, ...` exactly once in order and lends
/// out the processor's entry until the source is exhausted; after that it
/// keeps returning `Ok(None)`.
pub struct Rows<'a, P: RowProcessor + ?Sized> {
    processor: &'a mut P,
    next_row: RowId,
    exhausted: bool,
}

impl<'a, P: RowProcessor + ?Sized> Rows<'a, P> {
    pub fn new(processor: &'a mut P) -> Self {
        Self {
            processor,
            next_row: 0,
            exhausted: false,
        }
    }

    /// Load the next row and lend out the entry, or `Ok(None)` at the end.
    pub fn next_entry(&mut self) -> Result<Option<&Entry>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.processor.load_row(self.next_row)? {
            Some(_) => {
                self.next_row += 1;
                Ok(Some(self.processor.entry()))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

/// Iteration entry point for any processor, sized or boxed.
pub trait RowProcessorExt: RowProcessor {
    fn rows(&mut self) -> Rows<'_, Self> {
        Rows::new(self)
    }
}

impl<P: RowProcessor + ?Sized> RowProcessorExt for P {}
