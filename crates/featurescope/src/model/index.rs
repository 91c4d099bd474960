//! Model index for addressing cells in the feature tree.
//!
//! A `ModelIndex` names one cell: a row under some parent, a column, and the
//! tree item the row shows. Models hand indices out through
//! [`ItemModel::index`](super::ItemModel::index) and resolve them back
//! through the embedded item id, so indices are cheap `Copy` values.

use super::tree_item::ItemId;

/// Represents a cell position within an `ItemModel`.
///
/// The item id is what ties an index to a tree item; an index without one is
/// invalid and stands for the (hidden) root when used as a parent.
///
/// Proxy models hand out indices that carry the *source* item id together
/// with the proxy row, so mapping between the two views never has to search.
///
/// # Index Validity
///
/// Indices should be used immediately and not stored long-term. After the
/// model is rebuilt from a new feature snapshot, previously obtained
/// indices resolve to nothing.
///
/// # Example
///
/// ```ignore
/// let header = model.index(0, 0, &ModelIndex::invalid());
/// let first_feature = model.index(0, 0, &header);
/// let value_cell = first_feature.sibling_column(1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    item: Option<ItemId>,
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// Used as the parent of top-level rows and returned for out-of-range
    /// requests.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            item: None,
        }
    }

    /// Creates a valid index for `item` shown at `(row, column)`.
    #[inline]
    pub fn new(row: usize, column: usize, item: ItemId) -> Self {
        Self {
            row,
            column,
            item: Some(item),
        }
    }

    /// Returns `true` if this index addresses a cell.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.item.is_some()
    }

    /// Row within the parent. 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of the cell. 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// The tree item this index shows.
    #[inline]
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// The same row in another column.
    ///
    /// The result is not validated against the model's column count.
    #[inline]
    pub fn sibling_column(&self, column: usize) -> Self {
        if !self.is_valid() {
            return Self::invalid();
        }
        Self { column, ..*self }
    }

    /// Column-0 index of the same row.
    #[inline]
    pub fn first_column(&self) -> Self {
        self.sibling_column(0)
    }
}
