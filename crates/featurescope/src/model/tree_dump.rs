//! Text rendering of item models for debugging and logs.
//!
//! Works on any [`ItemModel`], so the full feature tree and a filtered
//! proxy view can be compared side by side:
//!
//! ```
//! use featurescope::model::{FeatureRef, FeatureTreeModel, MockFeature, TreeDump, TreeStyle};
//!
//! let gain: FeatureRef = MockFeature::float("Gain", 1.5).shared();
//! let root: FeatureRef = MockFeature::category("Analog", vec![gain]).shared();
//! let model = FeatureTreeModel::new(vec![root]);
//!
//! let text = TreeDump::with_style(TreeStyle::Ascii).format(&model);
//! assert_eq!(text, "Feature tree (2 rows):\nAnalog\n`-- Gain = 1.5\n");
//! ```

use super::index::ModelIndex;
use super::traits::ItemModel;

/// Tree visualization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

impl TreeStyle {
    /// (continuing branch, middle connector, last connector)
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|", "|-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        }
    }
}

/// Options for [`TreeDump`].
#[derive(Debug, Clone)]
pub struct TreeDumpOptions {
    /// Branch style.
    pub style: TreeStyle,
    /// Append ` = value` for rows with a non-empty value column.
    pub show_values: bool,
    /// Deepest level printed, top level being 0 (None for unlimited).
    pub max_depth: Option<usize>,
    /// Spaces after a continuing branch.
    pub indent_size: usize,
}

impl Default for TreeDumpOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_values: true,
            max_depth: None,
            indent_size: 3,
        }
    }
}

/// Renders an item model as an indented tree.
#[derive(Debug, Clone, Default)]
pub struct TreeDump {
    options: TreeDumpOptions,
}

impl TreeDump {
    /// A dump with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A dump with default options and the given style.
    pub fn with_style(style: TreeStyle) -> Self {
        Self::with_options(TreeDumpOptions {
            style,
            ..TreeDumpOptions::default()
        })
    }

    /// A dump with custom options.
    pub fn with_options(options: TreeDumpOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &TreeDumpOptions {
        &self.options
    }

    /// Renders every row of `model`.
    pub fn format(&self, model: &dyn ItemModel) -> String {
        let mut body = String::new();
        let mut ancestors_last = Vec::new();
        let rows = self.format_children(model, &ModelIndex::invalid(), &mut ancestors_last, &mut body);

        let mut output = format!("Feature tree ({rows} rows):\n");
        if rows == 0 {
            output.push_str("  (empty)\n");
        }
        output.push_str(&body);
        output
    }

    fn format_children(
        &self,
        model: &dyn ItemModel,
        parent: &ModelIndex,
        ancestors_last: &mut Vec<bool>,
        output: &mut String,
    ) -> usize {
        let depth = ancestors_last.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return 0;
        }

        let count = model.row_count(parent);
        let mut printed = 0;
        for row in 0..count {
            let index = model.index(row, 0, parent);
            if !index.is_valid() {
                continue;
            }
            let is_last = row + 1 == count;

            output.push_str(&self.prefix(ancestors_last, is_last));
            output.push_str(&model.display_text(&index).unwrap_or_default());
            if self.options.show_values {
                let value = model
                    .display_text(&index.sibling_column(1))
                    .unwrap_or_default();
                if !value.is_empty() {
                    output.push_str(" = ");
                    output.push_str(&value);
                }
            }
            output.push('\n');
            printed += 1;

            ancestors_last.push(is_last);
            printed += self.format_children(model, &index, ancestors_last, output);
            ancestors_last.pop();
        }
        printed
    }

    fn prefix(&self, ancestors_last: &[bool], is_last: bool) -> String {
        let Some((_, outer)) = ancestors_last.split_first() else {
            return String::new();
        };
        let (branch, middle, last) = self.options.style.glyphs();
        let indent = " ".repeat(self.options.indent_size);

        let mut prefix = String::new();
        for &ancestor_last in outer {
            if ancestor_last || branch.is_empty() {
                prefix.push_str(&" ".repeat(branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.push_str(&indent);
        }
        prefix.push_str(if is_last { last } else { middle });
        prefix
    }
}
