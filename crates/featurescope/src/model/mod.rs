//! Model/view layer over a camera's feature graph.
//!
//! This module turns the feature nodes reported by a GenICam-style device
//! into a two-column tree that views can browse, filter and edit:
//!
//! - Feature names and values with placeholder text for commands,
//!   inaccessible and unreadable features
//! - Visibility and keyword filtering that keeps the ancestors of matches
//! - Per-type editors that write back to the device node
//!
//! # Core Types
//!
//! - `FeatureNode`: handle protocol for one device feature
//! - `ModelIndex`: identifies a cell in a model
//! - `ItemRole` / `ItemData`: what to query and the type-erased answer
//! - `ItemModel`: the trait every model implements
//! - `ModelSignals`: change notifications
//!
//! # Model Implementations
//!
//! - `FeatureTreeModel`: the full tree, built once per feature snapshot
//! - `FeatureFilterProxy`: filtered view over a `FeatureTreeModel`
//! - `FeatureEditController`: editors for proxy cells and write-back
//!
//! # Example
//!
//! ```
//! use featurescope::model::{
//!     FeatureEditController, FeatureFilterProxy, FeatureRef, FeatureTreeModel, IntegerBounds,
//!     ItemModel, MockFeature, ModelIndex,
//! };
//! use std::sync::Arc;
//!
//! let gain: FeatureRef = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 1)).shared();
//! let root: FeatureRef = MockFeature::category("AnalogControl", vec![gain]).shared();
//!
//! let source = Arc::new(FeatureTreeModel::new(vec![root]));
//! let proxy = FeatureFilterProxy::new(source);
//! let editors = FeatureEditController::new(proxy.clone());
//!
//! let category = proxy.index(0, 0, &ModelIndex::invalid());
//! let gain_value = proxy.index(0, 1, &category);
//!
//! let mut editor = editors.editor_for(&gain_value).unwrap();
//! editor.set_integer(6);
//! editors.commit(&gain_value, &editor).unwrap();
//! assert_eq!(proxy.display_text(&gain_value).as_deref(), Some("6"));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! FeatureNode ──> FeatureTreeModel ──> FeatureFilterProxy ──> view
//!      ^                 ^                     │
//!      │                 └── commit_edit ──────┤
//!      └──────────── FeatureEditController <───┘
//! ```

mod editor;
mod feature;
mod feature_tree;
mod filter_proxy;
mod index;
#[cfg(any(test, feature = "mock-nodes"))]
mod mock;
mod role;
mod traits;
mod tree_dump;
mod tree_item;

pub use editor::{
    BOOLEAN_CHOICES, FeatureEditController, FeatureEditor, TRIGGER_LABEL, editor_for_feature,
};
pub use feature::{
    AccessMode, FeatureNode, FeatureRef, FeatureValue, IntegerBounds, InterfaceType, Visibility,
};
pub use feature_tree::{
    CATEGORY_BACKGROUND, CATEGORY_FOREGROUND, CLICK_HERE, FeatureTreeModel, NOT_ACCESSIBLE,
    NOT_READABLE, StyleHint, value_text,
};
pub use filter_proxy::FeatureFilterProxy;
pub use index::ModelIndex;
#[cfg(any(test, feature = "mock-nodes"))]
pub use mock::MockFeature;
pub use role::{Color, ItemData, ItemRole};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
pub use tree_dump::{TreeDump, TreeDumpOptions, TreeStyle};
pub use tree_item::{COLUMN_COUNT, HEADER_LABELS, ItemArena, ItemId, ItemPayload, TreeItem};
