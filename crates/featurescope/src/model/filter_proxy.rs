//! Filtering proxy over the feature tree.
//!
//! `FeatureFilterProxy` is a read-through view of a [`FeatureTreeModel`]
//! that hides rows by visibility tier and by keyword:
//!
//! - a leaf row is kept when its name matches the keyword (case-insensitive
//!   regex search) and its visibility is at or below the threshold;
//! - a category row is kept when at least one row below it is kept. Its own
//!   name and visibility do not matter.
//!
//! An empty keyword matches every name. A keyword that is not a valid
//! regular expression is matched literally, so typing `(` does not blank
//! the view.
//!
//! Indices handed out by the proxy carry the source item id with the proxy
//! row, so [`map_to_source`](FeatureFilterProxy::map_to_source) and
//! [`map_from_source`](FeatureFilterProxy::map_from_source) are lookups.
//!
//! # Example
//!
//! ```
//! use featurescope::model::{
//!     FeatureFilterProxy, FeatureRef, FeatureTreeModel, ItemModel, MockFeature, ModelIndex,
//!     Visibility,
//! };
//! use std::sync::Arc;
//!
//! let features: Vec<FeatureRef> = vec![
//!     MockFeature::float("ExposureTime", 10.0).shared(),
//!     MockFeature::float("Gain", 1.0).with_visibility(Visibility::Expert).shared(),
//! ];
//! let source = Arc::new(FeatureTreeModel::new(features));
//! let proxy = FeatureFilterProxy::new(source);
//!
//! assert_eq!(proxy.row_count(&ModelIndex::invalid()), 1);
//! proxy.set_visibility(Visibility::Expert);
//! assert_eq!(proxy.row_count(&ModelIndex::invalid()), 2);
//! proxy.set_keyword("gain");
//! assert_eq!(proxy.row_count(&ModelIndex::invalid()), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};

use featurescope_core::logging::{span_names, targets};
use featurescope_core::{ConnectionId, PerfSpan};

use super::feature::{FeatureNode, Visibility};
use super::feature_tree::FeatureTreeModel;
use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
use super::tree_item::{COLUMN_COUNT, ItemArena, ItemId};

/// How the keyword is matched against feature names.
#[derive(Debug, Clone)]
enum KeywordMatcher {
    Any,
    Pattern(Regex),
    /// Lowercased literal, used when the keyword is not a valid pattern.
    Literal(String),
}

impl KeywordMatcher {
    fn compile(keyword: &str) -> Self {
        if keyword.is_empty() {
            return KeywordMatcher::Any;
        }
        match RegexBuilder::new(keyword).case_insensitive(true).build() {
            Ok(regex) => KeywordMatcher::Pattern(regex),
            Err(err) => {
                tracing::debug!(target: targets::FILTER, keyword, %err, "keyword is not a valid pattern, matching literally");
                KeywordMatcher::Literal(keyword.to_lowercase())
            }
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            KeywordMatcher::Any => true,
            KeywordMatcher::Pattern(regex) => regex.is_match(name),
            KeywordMatcher::Literal(literal) => name.to_lowercase().contains(literal.as_str()),
        }
    }
}

#[derive(Debug)]
struct FilterState {
    visibility: Visibility,
    keyword: String,
    matcher: KeywordMatcher,
}

impl FilterState {
    fn accepts_leaf(&self, feature: &dyn FeatureNode) -> bool {
        let name = feature.display_name();
        let accepted = self.matcher.is_match(&name) && feature.visibility() <= self.visibility;
        tracing::trace!(target: targets::FILTER, %name, accepted, "row decision");
        accepted
    }
}

/// Visible rows per parent, in source order.
#[derive(Debug, Default)]
struct HierarchyMapping {
    /// `None` is the key of the top level.
    children: HashMap<Option<ItemId>, Vec<ItemId>>,
    rows: HashMap<ItemId, usize>,
}

impl HierarchyMapping {
    fn build(arena: &ItemArena, state: &FilterState) -> Self {
        let mut mapping = Self::default();
        mapping.collect(arena, state, None);
        mapping
    }

    /// Evaluates every child of `parent` and records the kept ones.
    /// Returns whether any child was kept.
    fn collect(&mut self, arena: &ItemArena, state: &FilterState, parent: Option<ItemId>) -> bool {
        let mut kept = Vec::new();
        for &child in arena.children_of(parent) {
            let Some(item) = arena.get(child) else {
                continue;
            };
            let include = if item.is_category() {
                self.collect(arena, state, Some(child))
            } else {
                item.feature()
                    .is_some_and(|feature| state.accepts_leaf(feature.as_ref()))
            };
            if include {
                kept.push(child);
            }
        }

        let any = !kept.is_empty();
        for (row, &id) in kept.iter().enumerate() {
            self.rows.insert(id, row);
        }
        self.children.insert(parent, kept);
        any
    }

    fn children_of(&self, parent: Option<ItemId>) -> &[ItemId] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn row_of(&self, id: ItemId) -> Option<usize> {
        self.rows.get(&id).copied()
    }
}

struct SourceConnections {
    reset: ConnectionId,
    data_changed: ConnectionId,
}

/// A filtering view over a [`FeatureTreeModel`].
///
/// Created behind an `Arc` so it can follow the source: a source reset
/// rebuilds the mapping and value edits are forwarded as proxy
/// `data_changed` notifications.
pub struct FeatureFilterProxy {
    source: Arc<FeatureTreeModel>,
    state: RwLock<FilterState>,
    mapping: RwLock<HierarchyMapping>,
    signals: ModelSignals,
    connections: SourceConnections,
}

impl FeatureFilterProxy {
    /// Wraps `source` with threshold `Beginner` and an empty keyword.
    pub fn new(source: Arc<FeatureTreeModel>) -> Arc<Self> {
        Self::with_filter(source, Visibility::Beginner, "")
    }

    /// Wraps `source` with an initial threshold and keyword.
    pub fn with_filter(
        source: Arc<FeatureTreeModel>,
        visibility: Visibility,
        keyword: &str,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let reset = {
                let weak = weak.clone();
                source.signals().model_reset.connect(move |_| {
                    if let Some(proxy) = weak.upgrade() {
                        proxy.source_reset();
                    }
                })
            };
            let data_changed = {
                let weak = weak.clone();
                source
                    .signals()
                    .data_changed
                    .connect(move |(top_left, bottom_right, roles)| {
                        if let Some(proxy) = weak.upgrade() {
                            proxy.forward_data_changed(top_left, bottom_right, roles);
                        }
                    })
            };

            let proxy = Self {
                source,
                state: RwLock::new(FilterState {
                    visibility,
                    keyword: keyword.to_string(),
                    matcher: KeywordMatcher::compile(keyword),
                }),
                mapping: RwLock::new(HierarchyMapping::default()),
                signals: ModelSignals::new(),
                connections: SourceConnections {
                    reset,
                    data_changed,
                },
            };
            proxy.rebuild_mapping();
            proxy
        })
    }

    /// The wrapped model.
    pub fn source(&self) -> &Arc<FeatureTreeModel> {
        &self.source
    }

    /// The visibility threshold.
    pub fn visibility(&self) -> Visibility {
        self.state.read().visibility
    }

    /// The current keyword.
    pub fn keyword(&self) -> String {
        self.state.read().keyword.clone()
    }

    /// Whether the keyword is matched as a regular expression (as opposed
    /// to literally, or not at all when empty).
    pub fn keyword_is_pattern(&self) -> bool {
        matches!(self.state.read().matcher, KeywordMatcher::Pattern(_))
    }

    /// Replaces the visibility threshold and re-derives the view.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.state.write().visibility = visibility;
        tracing::debug!(target: targets::FILTER, %visibility, "visibility threshold changed");
        self.invalidate();
    }

    /// Replaces the keyword and re-derives the view.
    pub fn set_keyword(&self, keyword: &str) {
        {
            let mut state = self.state.write();
            state.keyword = keyword.to_string();
            state.matcher = KeywordMatcher::compile(keyword);
        }
        tracing::debug!(target: targets::FILTER, keyword, "keyword changed");
        self.invalidate();
    }

    /// Re-derives the whole view, framed by layout signals.
    pub fn invalidate(&self) {
        self.signals.emit_layout_changed(|| self.rebuild_mapping());
    }

    fn rebuild_mapping(&self) {
        let _span = PerfSpan::new(span_names::FILTER_REBUILD);
        let mapping = {
            let state = self.state.read();
            self.source
                .with_arena(|arena| HierarchyMapping::build(arena, &state))
        };
        tracing::debug!(target: targets::FILTER, visible = mapping.rows.len(), "filter mapping rebuilt");
        *self.mapping.write() = mapping;
    }

    fn source_reset(&self) {
        self.signals.emit_reset(|| self.rebuild_mapping());
    }

    fn forward_data_changed(
        &self,
        top_left: &ModelIndex,
        bottom_right: &ModelIndex,
        roles: &[ItemRole],
    ) {
        let top_left = self.map_from_source(top_left);
        let bottom_right = self.map_from_source(bottom_right);
        if top_left.is_valid() && bottom_right.is_valid() {
            self.signals
                .data_changed
                .emit((top_left, bottom_right, roles.to_vec()));
        }
    }

    /// Number of rows kept by the filter, at every depth.
    pub fn visible_count(&self) -> usize {
        self.mapping.read().rows.len()
    }

    /// Whether the row of `source_index` is kept by the filter.
    pub fn accepts(&self, source_index: &ModelIndex) -> bool {
        source_index
            .item()
            .is_some_and(|id| self.mapping.read().row_of(id).is_some())
    }

    /// Maps a proxy index to the source index of the same cell.
    pub fn map_to_source(&self, proxy_index: &ModelIndex) -> ModelIndex {
        let Some(id) = proxy_index.item() else {
            return ModelIndex::invalid();
        };
        if self.mapping.read().row_of(id).is_none() {
            return ModelIndex::invalid();
        }
        self.source.index_for_item(id, proxy_index.column())
    }

    /// Maps a source index to the proxy index of the same cell; invalid when
    /// the row is filtered out.
    pub fn map_from_source(&self, source_index: &ModelIndex) -> ModelIndex {
        let Some(id) = source_index.item() else {
            return ModelIndex::invalid();
        };
        match self.mapping.read().row_of(id) {
            Some(row) => ModelIndex::new(row, source_index.column(), id),
            None => ModelIndex::invalid(),
        }
    }
}

impl std::fmt::Debug for FeatureFilterProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("FeatureFilterProxy")
            .field("visibility", &state.visibility)
            .field("keyword", &state.keyword)
            .field("visible_count", &self.mapping.read().rows.len())
            .finish_non_exhaustive()
    }
}

impl Drop for FeatureFilterProxy {
    fn drop(&mut self) {
        let signals = self.source.signals();
        signals.model_reset.disconnect(self.connections.reset);
        signals.data_changed.disconnect(self.connections.data_changed);
    }
}

impl ItemModel for FeatureFilterProxy {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.column() > 0 {
            return 0;
        }
        self.mapping.read().children_of(parent.item()).len()
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        COLUMN_COUNT
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        self.source.data(&self.map_to_source(index), role)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= COLUMN_COUNT || parent.column() > 0 {
            return ModelIndex::invalid();
        }
        match self.mapping.read().children_of(parent.item()).get(row) {
            Some(&id) => ModelIndex::new(row, column, id),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let Some(id) = index.item() else {
            return ModelIndex::invalid();
        };
        let Some(parent) = self.source.with_arena(|arena| arena.visible_parent(id)) else {
            return ModelIndex::invalid();
        };
        match self.mapping.read().row_of(parent) {
            Some(row) => ModelIndex::new(row, 0, parent),
            None => ModelIndex::invalid(),
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        self.source.set_data(&self.map_to_source(index), value, role)
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        self.source.flags(&self.map_to_source(index))
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        self.source.header_data(section, orientation, role)
    }
}

static_assertions::assert_impl_all!(FeatureFilterProxy: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::{AccessMode, FeatureRef, IntegerBounds};
    use crate::model::mock::MockFeature;
    use parking_lot::Mutex;

    /// Root(Category) → [Gain(Integer, Beginner), Advanced(Category, Expert) → [Note(String, Guru)]]
    fn scenario() -> Arc<FeatureTreeModel> {
        let gain: FeatureRef = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 1)).shared();
        let note: FeatureRef = MockFeature::string("Note", "calibrated")
            .with_access(AccessMode::ReadOnly)
            .with_visibility(Visibility::Guru)
            .shared();
        let advanced: FeatureRef = MockFeature::category("Advanced", vec![note])
            .with_visibility(Visibility::Expert)
            .shared();
        let root: FeatureRef = MockFeature::category("Root", vec![gain, advanced]).shared();
        Arc::new(FeatureTreeModel::new(vec![root]))
    }

    fn visible_names(proxy: &FeatureFilterProxy) -> Vec<String> {
        fn walk(proxy: &FeatureFilterProxy, parent: &ModelIndex, out: &mut Vec<String>) {
            for row in 0..proxy.row_count(parent) {
                let index = proxy.index(row, 0, parent);
                out.push(proxy.display_text(&index).unwrap_or_default());
                walk(proxy, &index, out);
            }
        }
        let mut out = Vec::new();
        walk(proxy, &ModelIndex::invalid(), &mut out);
        out
    }

    #[test]
    fn test_default_threshold_is_beginner() {
        let proxy = FeatureFilterProxy::new(scenario());
        assert_eq!(proxy.visibility(), Visibility::Beginner);
        assert_eq!(proxy.keyword(), "");
        assert_eq!(visible_names(&proxy), ["Root", "Gain"]);
    }

    #[test]
    fn test_guru_shows_everything() {
        let proxy = FeatureFilterProxy::new(scenario());
        proxy.set_visibility(Visibility::Guru);
        assert_eq!(visible_names(&proxy), ["Root", "Gain", "Advanced", "Note"]);
        assert_eq!(proxy.visible_count(), 4);
    }

    #[test]
    fn test_keyword_keeps_ancestors() {
        let proxy = FeatureFilterProxy::with_filter(scenario(), Visibility::Invisible, "GAIN");
        assert_eq!(visible_names(&proxy), ["Root", "Gain"]);

        proxy.set_keyword("no");
        assert_eq!(visible_names(&proxy), ["Root", "Advanced", "Note"]);

        proxy.set_keyword("^zzz$");
        assert!(visible_names(&proxy).is_empty());
    }

    #[test]
    fn test_category_name_does_not_match_by_itself() {
        let proxy = FeatureFilterProxy::with_filter(scenario(), Visibility::Invisible, "Advanced");
        assert!(visible_names(&proxy).is_empty());
    }

    #[test]
    fn test_invalid_pattern_matches_literally() {
        let features: Vec<FeatureRef> = vec![
            MockFeature::float("Gain(dB)", 0.0).shared(),
            MockFeature::float("Gain", 0.0).shared(),
        ];
        let proxy = FeatureFilterProxy::new(Arc::new(FeatureTreeModel::new(features)));

        proxy.set_keyword("gain(");
        assert!(!proxy.keyword_is_pattern());
        assert_eq!(visible_names(&proxy), ["Gain(dB)"]);

        proxy.set_keyword("ga.n");
        assert!(proxy.keyword_is_pattern());
        assert_eq!(visible_names(&proxy), ["Gain(dB)", "Gain"]);
    }

    #[test]
    fn test_mapping_roundtrip() {
        let source = scenario();
        let proxy = FeatureFilterProxy::new(source.clone());
        proxy.set_visibility(Visibility::Guru);

        let root = proxy.index(0, 0, &ModelIndex::invalid());
        let advanced = proxy.index(1, 0, &root);
        let note_value = proxy.index(0, 1, &advanced);

        let source_note = proxy.map_to_source(&note_value);
        assert_eq!(source.cell_content(&source_note), "calibrated");
        assert_eq!(proxy.map_from_source(&source_note), note_value);
        assert_eq!(proxy.parent(&note_value), advanced);
        assert_eq!(proxy.parent(&advanced), root);
        assert!(!proxy.parent(&root).is_valid());

        proxy.set_visibility(Visibility::Beginner);
        assert!(!proxy.map_from_source(&source_note).is_valid());
        assert!(!proxy.accepts(&source_note));
    }

    #[test]
    fn test_proxy_rows_are_compacted() {
        let features: Vec<FeatureRef> = vec![
            MockFeature::float("Hidden", 0.0).with_visibility(Visibility::Guru).shared(),
            MockFeature::float("Shown", 0.0).shared(),
        ];
        let source = Arc::new(FeatureTreeModel::new(features));
        let proxy = FeatureFilterProxy::new(source.clone());

        let shown = proxy.index(0, 1, &ModelIndex::invalid());
        assert_eq!(shown.row(), 0);
        assert_eq!(proxy.map_to_source(&shown).row(), 1);
        assert_eq!(proxy.data(&shown, ItemRole::Display).as_string(), Some("0.0"));
        assert!(!proxy.index(1, 0, &ModelIndex::invalid()).is_valid());
    }

    #[test]
    fn test_layout_signals_and_reset_follow() {
        let source = scenario();
        let proxy = FeatureFilterProxy::new(source.clone());
        let events = Arc::new(Mutex::new(Vec::new()));

        let e1 = events.clone();
        proxy.signals().layout_changed.connect(move |_| e1.lock().push("layout"));
        let e2 = events.clone();
        proxy.signals().model_reset.connect(move |_| e2.lock().push("reset"));

        proxy.set_keyword("gain");
        source.set_features(vec![MockFeature::boolean("ReverseX", false).shared()]);

        assert_eq!(*events.lock(), vec!["layout", "reset"]);
        assert!(visible_names(&proxy).is_empty());
        proxy.set_keyword("");
        assert_eq!(visible_names(&proxy), ["ReverseX"]);
    }

    #[test]
    fn test_edits_route_to_source_and_forward_changes() {
        let source = scenario();
        let proxy = FeatureFilterProxy::new(source.clone());
        let forwarded = Arc::new(Mutex::new(Vec::new()));

        let forwarded_clone = forwarded.clone();
        proxy.signals().data_changed.connect(move |(index, _, _)| {
            forwarded_clone.lock().push(*index);
        });

        let root = proxy.index(0, 0, &ModelIndex::invalid());
        let gain_value = proxy.index(0, 1, &root);
        assert!(proxy.flags(&gain_value).editable);
        assert!(proxy.set_data(&gain_value, ItemData::from("9"), ItemRole::Edit));
        assert_eq!(proxy.display_text(&gain_value).as_deref(), Some("9"));
        assert_eq!(*forwarded.lock(), vec![gain_value]);
        assert_eq!(
            proxy.header_data(1, Orientation::Horizontal, ItemRole::Display).as_string(),
            Some("Value")
        );
    }

    #[test]
    fn test_drop_disconnects_from_source() {
        let source = scenario();
        let before = source.signals().model_reset.connection_count();
        let proxy = FeatureFilterProxy::new(source.clone());
        assert_eq!(source.signals().model_reset.connection_count(), before + 1);
        drop(proxy);
        assert_eq!(source.signals().model_reset.connection_count(), before);
        assert_eq!(source.signals().data_changed.connection_count(), 0);
    }
}
