//! Per-type value editors and the bridge back to the feature tree.
//!
//! A view asks [`FeatureEditController::editor_for`] which editor to open
//! on a value cell, lets the user change it, and hands it back to
//! [`FeatureEditController::commit`]. Editors are plain data; rendering
//! them is up to the view.
//!
//! | Interface | Editor |
//! |---|---|
//! | Integer | [`FeatureEditor::IntegerSpin`] seeded with the device bounds |
//! | Command | [`FeatureEditor::Trigger`] |
//! | Boolean | [`FeatureEditor::BooleanChoice`] (`False` / `True`) |
//! | Enumeration | [`FeatureEditor::EnumerationChoice`] |
//! | String | [`FeatureEditor::Text`] |
//! | Float | [`FeatureEditor::FloatText`] |
//!
//! Other interfaces, the name column and nodes whose current value cannot
//! be read get no editor.

use std::sync::Arc;

use featurescope_core::logging::targets;

use super::feature::{FeatureNode, FeatureValue, IntegerBounds, InterfaceType};
use super::filter_proxy::FeatureFilterProxy;
use super::index::ModelIndex;
use super::role::ItemData;
use crate::error::{FeatureError, FeatureResult};

/// Labels of the boolean choice, in display order.
pub const BOOLEAN_CHOICES: [&str; 2] = ["False", "True"];

/// Label of the command trigger.
pub const TRIGGER_LABEL: &str = "Execute";

/// An editor for one value cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureEditor {
    /// Bounded integer spin box.
    IntegerSpin {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
        /// Increment.
        step: i64,
        /// Current value, always inside the bounds and on the step grid.
        value: i64,
    },
    /// A button that executes a command.
    Trigger,
    /// Two-entry `False` / `True` choice.
    BooleanChoice {
        /// Selected entry.
        value: bool,
    },
    /// Choice among the enumeration's symbols.
    EnumerationChoice {
        /// Symbols in device order.
        entries: Vec<String>,
        /// Selected symbol.
        current: String,
    },
    /// Free text.
    Text {
        /// Edited text.
        value: String,
    },
    /// Decimal text for a float feature.
    FloatText {
        /// Edited text.
        value: String,
    },
}

impl FeatureEditor {
    /// The integer bounds of a spin editor.
    pub fn bounds(&self) -> Option<IntegerBounds> {
        match *self {
            FeatureEditor::IntegerSpin { min, max, step, .. } => {
                Some(IntegerBounds::new(min, max, step))
            }
            _ => None,
        }
    }

    /// Sets the spin value, clamped and snapped onto the step grid.
    ///
    /// Returns the value actually stored, `None` for other editors.
    pub fn set_integer(&mut self, requested: i64) -> Option<i64> {
        let bounds = self.bounds()?;
        let FeatureEditor::IntegerSpin { value, .. } = self else {
            return None;
        };
        *value = bounds.constrain(requested);
        Some(*value)
    }

    /// Moves the spin value by `steps` increments.
    pub fn step_by(&mut self, steps: i64) -> Option<i64> {
        match *self {
            FeatureEditor::IntegerSpin { value, step, .. } => {
                self.set_integer(value.saturating_add(steps.saturating_mul(step)))
            }
            _ => None,
        }
    }

    /// Selects a boolean entry.
    pub fn set_bool(&mut self, selected: bool) -> bool {
        match self {
            FeatureEditor::BooleanChoice { value } => {
                *value = selected;
                true
            }
            _ => false,
        }
    }

    /// Selects an enumeration symbol. Unknown symbols are refused.
    pub fn select_entry(&mut self, symbol: &str) -> bool {
        match self {
            FeatureEditor::EnumerationChoice { entries, current } => {
                if entries.iter().any(|entry| entry == symbol) {
                    *current = symbol.to_string();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Replaces the text of a text editor.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            FeatureEditor::Text { value } | FeatureEditor::FloatText { value } => {
                *value = text.into();
                true
            }
            _ => false,
        }
    }

    /// Caption of a button or choice editor.
    pub fn label(&self) -> Option<&str> {
        match self {
            FeatureEditor::Trigger => Some(TRIGGER_LABEL),
            FeatureEditor::BooleanChoice { value } => Some(BOOLEAN_CHOICES[usize::from(*value)]),
            FeatureEditor::EnumerationChoice { current, .. } => Some(current),
            _ => None,
        }
    }

    /// The edited value as it is committed to the model.
    pub fn result(&self) -> ItemData {
        match self {
            FeatureEditor::IntegerSpin { value, .. } => ItemData::Int(*value),
            FeatureEditor::Trigger => ItemData::Bool(true),
            FeatureEditor::BooleanChoice { value } => ItemData::Bool(*value),
            FeatureEditor::EnumerationChoice { current, .. } => ItemData::String(current.clone()),
            FeatureEditor::Text { value } | FeatureEditor::FloatText { value } => {
                ItemData::String(value.clone())
            }
        }
    }
}

/// Picks the editor for `feature`, seeded with its current value.
///
/// `None` when the interface has no editor or the seed cannot be read.
pub fn editor_for_feature(feature: &dyn FeatureNode) -> Option<FeatureEditor> {
    let interface = feature.interface_type();
    if interface == InterfaceType::Command {
        return Some(FeatureEditor::Trigger);
    }
    if !matches!(
        interface,
        InterfaceType::Integer
            | InterfaceType::Boolean
            | InterfaceType::Enumeration
            | InterfaceType::String
            | InterfaceType::Float
    ) {
        return None;
    }

    let seed = match feature.value() {
        Ok(seed) => seed,
        Err(err) => {
            tracing::debug!(target: targets::EDITOR, feature = %feature.display_name(), %err, "no editor, seed unreadable");
            return None;
        }
    };

    let editor = match (interface, seed) {
        (InterfaceType::Integer, FeatureValue::Integer(value)) => {
            let bounds = feature
                .bounds()
                .unwrap_or(IntegerBounds::new(i64::MIN, i64::MAX, 1));
            FeatureEditor::IntegerSpin {
                min: bounds.min,
                max: bounds.max,
                step: bounds.step,
                value: bounds.constrain(value),
            }
        }
        (InterfaceType::Boolean, FeatureValue::Boolean(value)) => {
            FeatureEditor::BooleanChoice { value }
        }
        (InterfaceType::Enumeration, FeatureValue::Enumeration(current)) => {
            FeatureEditor::EnumerationChoice {
                entries: feature.entries(),
                current,
            }
        }
        (InterfaceType::String, FeatureValue::String(value)) => FeatureEditor::Text { value },
        (InterfaceType::Float, value @ FeatureValue::Float(_)) => FeatureEditor::FloatText {
            value: value.to_display_string(),
        },
        (interface, seed) => {
            tracing::warn!(
                target: targets::EDITOR,
                feature = %feature.display_name(),
                %interface,
                ?seed,
                "value does not match interface type"
            );
            return None;
        }
    };

    tracing::trace!(target: targets::EDITOR, feature = %feature.display_name(), ?editor, "editor created");
    Some(editor)
}

/// Opens editors on proxy cells and commits them to the source model.
#[derive(Debug, Clone)]
pub struct FeatureEditController {
    proxy: Arc<FeatureFilterProxy>,
}

impl FeatureEditController {
    /// A controller working on the cells of `proxy`.
    pub fn new(proxy: Arc<FeatureFilterProxy>) -> Self {
        Self { proxy }
    }

    /// The proxy the controller edits through.
    pub fn proxy(&self) -> &Arc<FeatureFilterProxy> {
        &self.proxy
    }

    fn feature_for(&self, proxy_index: &ModelIndex) -> Option<Arc<dyn FeatureNode>> {
        let source_index = self.proxy.map_to_source(proxy_index);
        self.proxy.source().feature_at(&source_index)
    }

    /// The editor for a proxy value cell.
    pub fn editor_for(&self, proxy_index: &ModelIndex) -> Option<FeatureEditor> {
        if proxy_index.column() != 1 {
            return None;
        }
        let feature = self.feature_for(proxy_index)?;
        editor_for_feature(feature.as_ref())
    }

    /// Commits the editor's result to the feature under `proxy_index`.
    pub fn commit(&self, proxy_index: &ModelIndex, editor: &FeatureEditor) -> FeatureResult<()> {
        let source_index = self.proxy.map_to_source(proxy_index);
        if !source_index.is_valid() {
            return Err(FeatureError::InvalidIndex);
        }
        let result = self.proxy.source().commit_edit(&source_index, &editor.result());
        if let Err(err) = &result {
            tracing::warn!(target: targets::EDITOR, %err, row = proxy_index.row(), "editor commit failed");
        }
        result
    }

    /// Executes the command under `proxy_index` directly.
    pub fn trigger(&self, proxy_index: &ModelIndex) -> FeatureResult<()> {
        let feature = self
            .feature_for(proxy_index)
            .ok_or(FeatureError::InvalidIndex)?;
        if feature.interface_type() != InterfaceType::Command {
            return Err(FeatureError::NotExecutable);
        }
        feature.execute()?;
        tracing::debug!(target: targets::EDITOR, feature = %feature.display_name(), "command executed");
        Ok(())
    }
}
