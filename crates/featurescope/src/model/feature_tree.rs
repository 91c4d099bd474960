//! The feature tree model.
//!
//! `FeatureTreeModel` projects a camera's feature graph onto the two-column
//! [`ItemModel`] protocol: column 0 shows the feature name, column 1 its
//! current value. The tree shape is built once per feature snapshot; values,
//! access modes and tooltips are re-read from the nodes on every query.
//!
//! # Value column
//!
//! | Row | Text |
//! |---|---|
//! | Category | empty |
//! | Command | `[Click here]` |
//! | access mode neither read-write nor read-only | `[Not accessible]` |
//! | type without a readable value | `[Not readable]` |
//! | anything else | the value, or the node's secondary text conversion |
//!
//! # Example
//!
//! ```
//! use featurescope::model::{
//!     FeatureRef, FeatureTreeModel, IntegerBounds, ItemData, ItemModel, MockFeature, ModelIndex,
//! };
//!
//! let gain: FeatureRef = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 1)).shared();
//! let model = FeatureTreeModel::new(vec![gain]);
//!
//! let value = model.index(0, 1, &ModelIndex::invalid());
//! assert_eq!(model.cell_content(&value), "4");
//!
//! model.commit_edit(&value, &ItemData::from("7")).unwrap();
//! assert_eq!(model.cell_content(&value), "7");
//! ```

use parking_lot::RwLock;

use featurescope_core::PerfSpan;
use featurescope_core::logging::{span_names, targets};

use super::feature::{FeatureNode, FeatureRef, FeatureValue, InterfaceType};
use super::index::ModelIndex;
use super::role::{Color, ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
use super::tree_item::{COLUMN_COUNT, HEADER_LABELS, ItemArena, ItemId, ItemPayload};
use crate::error::{FeatureError, FeatureResult};

/// Value text of a command row.
pub const CLICK_HERE: &str = "[Click here]";
/// Value text of a row whose access mode forbids reading.
pub const NOT_ACCESSIBLE: &str = "[Not accessible]";
/// Value text of a row whose type has no readable value.
pub const NOT_READABLE: &str = "[Not readable]";

/// Background of category rows.
pub const CATEGORY_BACKGROUND: Color = Color::rgba(56, 147, 189, 1);
/// Foreground of category rows.
pub const CATEGORY_FOREGROUND: Color = Color::WHITE;

/// Colors a view should use for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleHint {
    /// Row background.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
}

impl StyleHint {
    /// The hint given to category rows.
    pub const CATEGORY: StyleHint = StyleHint {
        background: CATEGORY_BACKGROUND,
        foreground: CATEGORY_FOREGROUND,
    };
}

/// Renders the value column text for `feature`.
pub fn value_text(feature: &dyn FeatureNode) -> String {
    let interface = feature.interface_type();
    match interface {
        InterfaceType::Category => String::new(),
        InterfaceType::Command => CLICK_HERE.to_string(),
        _ if !feature.access_mode().is_readable() => NOT_ACCESSIBLE.to_string(),
        _ if !interface.has_readable_value() => NOT_READABLE.to_string(),
        _ => match feature.value() {
            Ok(value) => value.to_string(),
            Err(err) => {
                tracing::trace!(
                    target: targets::MODEL,
                    feature = %feature.display_name(),
                    %err,
                    "value unavailable, using string conversion"
                );
                feature.to_string_value().unwrap_or_default()
            }
        },
    }
}

/// Python-style truthiness of a committed command value.
///
/// Text is false when empty, `0` or `false` (any case).
fn is_truthy(value: &ItemData) -> bool {
    match value {
        ItemData::None => false,
        ItemData::Bool(b) => *b,
        ItemData::Int(n) => *n != 0,
        ItemData::Float(x) => *x != 0.0,
        ItemData::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        ItemData::Color(_) => true,
    }
}

/// A two-column tree model over a camera's feature graph.
///
/// The model is `Send + Sync`; the tree lives behind a `parking_lot`
/// lock so the filter proxy and edit controller can share it through an
/// `Arc`.
pub struct FeatureTreeModel {
    arena: RwLock<ItemArena>,
    signals: ModelSignals,
}

impl Default for FeatureTreeModel {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for FeatureTreeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureTreeModel")
            .field("feature_count", &self.feature_count())
            .finish_non_exhaustive()
    }
}

impl FeatureTreeModel {
    /// Builds the tree for the given top-level features.
    pub fn new(features: Vec<FeatureRef>) -> Self {
        let mut arena = ItemArena::new();
        Self::rebuild(&mut arena, &features);
        Self {
            arena: RwLock::new(arena),
            signals: ModelSignals::new(),
        }
    }

    /// A model with no features.
    pub fn empty() -> Self {
        Self {
            arena: RwLock::new(ItemArena::new()),
            signals: ModelSignals::new(),
        }
    }

    fn rebuild(arena: &mut ItemArena, features: &[FeatureRef]) {
        let _span = PerfSpan::new(span_names::TREE_BUILD);
        arena.rebuild(features);
        tracing::debug!(
            target: targets::MODEL,
            top_level = features.len(),
            items = arena.len() - 1,
            "feature tree built"
        );
    }

    /// Replaces the tree with one built from a new feature snapshot.
    ///
    /// Emits `model_about_to_reset` / `model_reset` around the rebuild.
    /// Indices taken before the reset no longer resolve.
    pub fn set_features(&self, features: Vec<FeatureRef>) {
        self.signals.emit_reset(|| {
            Self::rebuild(&mut self.arena.write(), &features);
        });
    }

    /// Drops every feature.
    pub fn clear(&self) {
        self.signals.emit_reset(|| {
            self.arena.write().reset();
        });
        tracing::debug!(target: targets::MODEL, "feature tree cleared");
    }

    /// Number of feature rows in the whole tree.
    pub fn feature_count(&self) -> usize {
        self.arena.read().len() - 1
    }

    /// Runs `f` with read access to the tree.
    ///
    /// `f` must not call back into the model's write paths.
    pub fn with_arena<R>(&self, f: impl FnOnce(&ItemArena) -> R) -> R {
        f(&self.arena.read())
    }

    /// The index of `item` in `column`; invalid for the root or a stale id.
    pub fn index_for_item(&self, item: ItemId, column: usize) -> ModelIndex {
        let arena = self.arena.read();
        if item == arena.root() || column >= COLUMN_COUNT {
            return ModelIndex::invalid();
        }
        match arena.row_of(item) {
            Some(row) => ModelIndex::new(row, column, item),
            None => ModelIndex::invalid(),
        }
    }

    /// The feature shown by the row of `index`.
    pub fn feature_at(&self, index: &ModelIndex) -> Option<FeatureRef> {
        let id = index.item()?;
        self.arena.read().get(id)?.feature().cloned()
    }

    /// Whether the row of `index` is a category.
    pub fn is_category(&self, index: &ModelIndex) -> bool {
        self.feature_at(index)
            .is_some_and(|feature| feature.interface_type() == InterfaceType::Category)
    }

    /// Text of a cell.
    ///
    /// Column 0 is the feature name (or the header label for the root item),
    /// column 1 the value text described in the module docs. Invalid
    /// indices give an empty string.
    pub fn cell_content(&self, index: &ModelIndex) -> String {
        let Some(id) = index.item() else {
            return String::new();
        };
        let payload = match self.arena.read().get(id) {
            Some(item) => item.payload().clone(),
            None => return String::new(),
        };
        match payload {
            ItemPayload::Header(labels) => labels
                .get(index.column())
                .map(|label| label.to_string())
                .unwrap_or_default(),
            ItemPayload::Feature(feature) => match index.column() {
                0 => feature.display_name(),
                1 => value_text(feature.as_ref()),
                _ => String::new(),
            },
        }
    }

    /// Tooltip of the row's feature.
    pub fn tooltip(&self, index: &ModelIndex) -> Option<String> {
        self.feature_at(index)?.tooltip()
    }

    /// Colors for the row; only categories have a hint.
    pub fn style_hint(&self, index: &ModelIndex) -> Option<StyleHint> {
        self.is_category(index).then_some(StyleHint::CATEGORY)
    }

    /// Whether a view may put the cell into edit focus.
    ///
    /// Name cells are always navigable. A value cell qualifies only when the
    /// feature's access mode allows writing.
    pub fn is_editable(&self, index: &ModelIndex) -> bool {
        let Some(feature) = self.feature_at(index) else {
            return false;
        };
        match index.column() {
            0 => true,
            1 => feature.access_mode().is_writable(),
            _ => false,
        }
    }

    /// Writes an edited value back to the row's feature.
    ///
    /// Commands execute when `value` is truthy and do nothing otherwise.
    /// Booleans accept `true` in any letter case, anything else is false.
    /// Floats and integers must parse; enumerations take the symbol and the
    /// remaining types receive the raw text. Emits `data_changed` for
    /// `index` on success.
    pub fn commit_edit(&self, index: &ModelIndex, value: &ItemData) -> FeatureResult<()> {
        let feature = self.feature_at(index).ok_or(FeatureError::InvalidIndex)?;
        let interface = feature.interface_type();

        match interface {
            InterfaceType::Command => {
                if !is_truthy(value) {
                    tracing::trace!(target: targets::MODEL, feature = %feature.display_name(), "falsy command commit ignored");
                    return Ok(());
                }
                feature.execute()?;
            }
            InterfaceType::Category => return Err(FeatureError::NotWritable),
            _ => {
                if !feature.access_mode().is_writable() {
                    return Err(FeatureError::NotWritable);
                }
                let raw = value
                    .to_edit_text()
                    .ok_or_else(|| FeatureError::InvalidValue(format!("{value:?} has no text form")))?;
                let parsed = FeatureValue::from_edit_text(interface, &raw)?;
                feature.set_value(parsed)?;
            }
        }

        tracing::debug!(target: targets::MODEL, feature = %feature.display_name(), %interface, "edit committed");
        self.signals
            .emit_data_changed_single(*index, vec![ItemRole::Display, ItemRole::Edit]);
        Ok(())
    }
}

impl ItemModel for FeatureTreeModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.column() > 0 {
            return 0;
        }
        self.arena.read().children_of(parent.item()).len()
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        COLUMN_COUNT
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() {
            return ItemData::None;
        }
        match role {
            ItemRole::Display => ItemData::from(self.cell_content(index)),
            ItemRole::Edit if index.column() == 1 => ItemData::from(self.cell_content(index)),
            ItemRole::Edit => ItemData::None,
            ItemRole::ToolTip => ItemData::from(self.tooltip(index)),
            ItemRole::BackgroundColor => ItemData::from(self.style_hint(index).map(|hint| hint.background)),
            ItemRole::ForegroundColor => ItemData::from(self.style_hint(index).map(|hint| hint.foreground)),
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= COLUMN_COUNT || parent.column() > 0 {
            return ModelIndex::invalid();
        }
        let arena = self.arena.read();
        match arena.children_of(parent.item()).get(row) {
            Some(&child) => ModelIndex::new(row, column, child),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let Some(id) = index.item() else {
            return ModelIndex::invalid();
        };
        let arena = self.arena.read();
        let Some(parent) = arena.visible_parent(id) else {
            return ModelIndex::invalid();
        };
        match arena.row_of(parent) {
            Some(row) => ModelIndex::new(row, 0, parent),
            None => ModelIndex::invalid(),
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        if role != ItemRole::Edit {
            return false;
        }
        match self.commit_edit(index, &value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: targets::MODEL, %err, row = index.row(), "edit rejected");
                false
            }
        }
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        let Some(feature) = self.feature_at(index) else {
            return ItemFlags::none();
        };
        if feature.access_mode().is_writable() {
            ItemFlags::none().with_enabled(true).with_editable(true)
        } else if index.column() == 1 {
            ItemFlags::none()
        } else {
            ItemFlags::none().with_enabled(true)
        }
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if orientation != Orientation::Horizontal || role != ItemRole::Display {
            return ItemData::None;
        }
        ItemData::from(HEADER_LABELS.get(section).copied())
    }
}

static_assertions::assert_impl_all!(FeatureTreeModel: Send, Sync);
