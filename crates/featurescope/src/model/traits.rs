//! The model protocol shared by the feature tree and its proxies.
//!
//! Views talk to any [`ItemModel`] the same way: walk rows with
//! [`ItemModel::index`] / [`ItemModel::parent`], read cells per
//! [`ItemRole`], ask [`ItemFlags`] before opening an editor, and listen on
//! [`ModelSignals`] to know when to re-query.

use featurescope_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// What a view may do with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// The cell reacts to input and can be navigated to.
    pub enabled: bool,
    /// The cell accepts edits.
    pub editable: bool,
}

impl ItemFlags {
    /// An enabled, read-only cell.
    pub const ENABLED: ItemFlags = ItemFlags {
        enabled: true,
        editable: false,
    };

    /// An inert cell.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the flags with `editable` replaced.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Returns the flags with `enabled` replaced.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether neither flag is set.
    pub fn is_empty(&self) -> bool {
        !self.enabled && !self.editable
    }
}

/// A tree of two-column rows addressed by [`ModelIndex`].
///
/// The invalid index stands for the hidden root, so top-level rows are
/// `index(row, column, &ModelIndex::invalid())`. Only column 0 has
/// children. Navigation never panics: out-of-range requests answer with
/// an invalid index or a count of 0.
///
/// Models that accept edits override [`set_data`](ItemModel::set_data) and
/// [`flags`](ItemModel::flags), and emit `data_changed` once a write went
/// through.
pub trait ItemModel: Send + Sync {
    /// Rows under `parent`.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Columns of the rows under `parent`.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// The value of one cell for `role`, `ItemData::None` when there is none.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// The cell at `(row, column)` under `parent`.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// The column-0 index of the row owning `index`; invalid at top level.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Change notifications.
    fn signals(&self) -> &ModelSignals;

    /// Writes `value` into a cell. Read-only unless overridden.
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// What a view may do with a cell.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::ENABLED
    }

    /// Whether any row hangs under `parent`.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Header label of a section.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Shorthand for the `Display` role as text.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }
}

/// Which header `header_data` is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Column labels.
    Horizontal,
    /// Row labels.
    Vertical,
}

/// Notifications a model sends to its views.
///
/// - **Value edits**: `data_changed`
/// - **Filter changes**: `layout_about_to_change` / `layout_changed`
/// - **New feature snapshot**: `model_about_to_reset` / `model_reset`
pub struct ModelSignals {
    /// A rectangle of cells changed: (first cell, last cell, roles).
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,
    /// The visible row set is about to be re-derived.
    pub layout_about_to_change: Signal<()>,
    /// The visible row set was re-derived; stored indices are stale.
    pub layout_changed: Signal<()>,
    /// The whole tree is about to be replaced.
    pub model_about_to_reset: Signal<()>,
    /// The whole tree was replaced.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Signals with no connections.
    pub fn new() -> Self {
        Self {
            data_changed: Signal::new(),
            layout_about_to_change: Signal::new(),
            layout_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// `data_changed` for one cell.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index, index, roles));
    }

    /// Runs `reset` between `model_about_to_reset` and `model_reset`.
    pub fn emit_reset(&self, reset: impl FnOnce()) {
        self.model_about_to_reset.emit(());
        reset();
        self.model_reset.emit(());
    }

    /// Runs `change` between `layout_about_to_change` and `layout_changed`.
    pub fn emit_layout_changed(&self, change: impl FnOnce()) {
        self.layout_about_to_change.emit(());
        change();
        self.layout_changed.emit(());
    }
}

impl std::fmt::Debug for ModelSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSignals")
            .field("data_changed", &self.data_changed)
            .field("layout_changed", &self.layout_changed)
            .field("model_reset", &self.model_reset)
            .finish_non_exhaustive()
    }
}
