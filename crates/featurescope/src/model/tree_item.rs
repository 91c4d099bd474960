//! Arena storage for the feature tree.
//!
//! Every row of the tree is a [`TreeItem`] stored in a `slotmap` arena and
//! addressed by [`ItemId`]. Children are owned by the arena and listed in
//! order on their parent; the parent link is a plain id used for row
//! computation only.
//!
//! The arena always has one hidden root item that carries the column header
//! labels. Top-level features are its children.

use slotmap::{SlotMap, new_key_type};

use super::feature::{FeatureNode, FeatureRef, InterfaceType};

new_key_type! {
    /// Identifier of one tree item.
    pub struct ItemId;
}

/// Column header labels carried by the root item.
pub const HEADER_LABELS: [&str; 2] = ["Feature Name", "Value"];

/// Number of columns every row has: name and value.
pub const COLUMN_COUNT: usize = HEADER_LABELS.len();

/// What a tree item shows.
#[derive(Debug, Clone)]
pub enum ItemPayload {
    /// The hidden root: column header labels, no feature.
    Header([&'static str; 2]),
    /// One camera feature.
    Feature(FeatureRef),
}

/// One row of the feature tree.
#[derive(Debug, Clone)]
pub struct TreeItem {
    payload: ItemPayload,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

impl TreeItem {
    /// The feature behind this row, `None` for the root.
    pub fn feature(&self) -> Option<&FeatureRef> {
        match &self.payload {
            ItemPayload::Feature(feature) => Some(feature),
            ItemPayload::Header(_) => None,
        }
    }

    /// The payload of this row.
    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    /// Whether this is the header root.
    pub fn is_header(&self) -> bool {
        matches!(self.payload, ItemPayload::Header(_))
    }

    /// Whether the row is a category.
    pub fn is_category(&self) -> bool {
        self.feature()
            .is_some_and(|feature| feature.interface_type() == InterfaceType::Category)
    }

    /// The parent item, `None` for the root.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    /// Child at `row`.
    pub fn child(&self, row: usize) -> Option<ItemId> {
        self.children.get(row).copied()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// The arena holding one feature tree.
#[derive(Debug)]
pub struct ItemArena {
    items: SlotMap<ItemId, TreeItem>,
    root: ItemId,
}

impl Default for ItemArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemArena {
    /// An arena with only the header root.
    pub fn new() -> Self {
        let mut items = SlotMap::with_key();
        let root = items.insert(Self::header_item());
        Self { items, root }
    }

    /// Builds the whole tree for `features` depth-first.
    pub fn build(features: &[FeatureRef]) -> Self {
        let mut arena = Self::new();
        arena.rebuild(features);
        arena
    }

    fn header_item() -> TreeItem {
        TreeItem {
            payload: ItemPayload::Header(HEADER_LABELS),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Drops every item and starts over with a fresh header root.
    ///
    /// The slot map is kept, so ids handed out before the reset stop
    /// resolving instead of aliasing new items.
    pub fn reset(&mut self) {
        self.items.clear();
        self.root = self.items.insert(Self::header_item());
    }

    /// Replaces the tree with one for `features`, in place.
    ///
    /// Categories are expanded recursively in the same pass. The graph must
    /// be acyclic.
    pub fn rebuild(&mut self, features: &[FeatureRef]) {
        self.reset();
        let root = self.root;
        self.populate(root, features);
    }

    fn populate(&mut self, parent: ItemId, features: &[FeatureRef]) {
        for feature in features {
            let id = self.items.insert(TreeItem {
                payload: ItemPayload::Feature(feature.clone()),
                parent: Some(parent),
                children: Vec::new(),
            });
            if let Some(parent_item) = self.items.get_mut(parent) {
                parent_item.children.push(id);
            }
            if feature.interface_type() == InterfaceType::Category {
                self.populate(id, &feature.children());
            }
        }
    }

    /// The hidden header root.
    pub fn root(&self) -> ItemId {
        self.root
    }

    /// Looks up an item.
    pub fn get(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(id)
    }

    /// Total number of items, the root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    /// Children of `parent`; `None` stands for the root.
    pub fn children_of(&self, parent: Option<ItemId>) -> &[ItemId] {
        self.items
            .get(parent.unwrap_or(self.root))
            .map(|item| item.children.as_slice())
            .unwrap_or(&[])
    }

    /// Position of `id` among its siblings. The root is row 0.
    pub fn row_of(&self, id: ItemId) -> Option<usize> {
        let item = self.items.get(id)?;
        match item.parent {
            Some(parent) => self
                .items
                .get(parent)?
                .children
                .iter()
                .position(|&child| child == id),
            None => Some(0),
        }
    }

    /// Parent of `id`, with the hidden root reported as `None`.
    pub fn visible_parent(&self, id: ItemId) -> Option<ItemId> {
        self.items
            .get(id)?
            .parent
            .filter(|&parent| parent != self.root)
    }

    /// All item ids below `id` in depth-first order, `id` excluded.
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack: Vec<ItemId> = self.children_of(Some(id)).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children_of(Some(next)).iter().rev().copied());
        }
        out
    }
}
