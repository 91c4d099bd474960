//! In-memory feature nodes for demos, fixtures and tests.
//!
//! [`MockFeature`] implements [`FeatureNode`] without a device. Values live
//! behind a lock so writes and command executions can be observed:
//!
//! ```
//! use featurescope::model::{FeatureNode, FeatureRef, IntegerBounds, MockFeature, Visibility};
//!
//! let gain = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 1)).shared();
//! let root: FeatureRef = MockFeature::category("Root", vec![gain.clone() as FeatureRef])
//!     .with_visibility(Visibility::Beginner)
//!     .shared();
//!
//! assert_eq!(gain.write_count(), 0);
//! assert_eq!(root.children().len(), 1);
//! ```
//!
//! Enabled by the `mock-nodes` feature (on by default) and always in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::feature::{
    AccessMode, FeatureNode, FeatureRef, FeatureValue, IntegerBounds, InterfaceType, Visibility,
};
use crate::error::{FeatureError, FeatureResult};

/// A feature node backed by memory.
#[derive(Debug)]
pub struct MockFeature {
    name: String,
    interface: InterfaceType,
    access: RwLock<AccessMode>,
    visibility: Visibility,
    tooltip: Option<String>,
    value: RwLock<Option<FeatureValue>>,
    string_fallback: Option<String>,
    bounds: Option<IntegerBounds>,
    entries: Vec<String>,
    children: Vec<FeatureRef>,
    executions: AtomicUsize,
    writes: AtomicUsize,
}

impl MockFeature {
    fn with_type(name: impl Into<String>, interface: InterfaceType) -> Self {
        Self {
            name: name.into(),
            interface,
            access: RwLock::new(AccessMode::ReadWrite),
            visibility: Visibility::Beginner,
            tooltip: None,
            value: RwLock::new(None),
            string_fallback: None,
            bounds: None,
            entries: Vec::new(),
            children: Vec::new(),
            executions: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    fn with_value(mut self, value: FeatureValue) -> Self {
        self.value = RwLock::new(Some(value));
        self
    }

    /// A category grouping `children`. Categories are read-only.
    pub fn category(name: impl Into<String>, children: Vec<FeatureRef>) -> Self {
        let mut node = Self::with_type(name, InterfaceType::Category);
        node.children = children;
        node.with_access(AccessMode::ReadOnly)
    }

    /// A read-write integer.
    pub fn integer(name: impl Into<String>, value: i64, bounds: IntegerBounds) -> Self {
        let mut node = Self::with_type(name, InterfaceType::Integer);
        node.bounds = Some(bounds);
        node.with_value(FeatureValue::Integer(value))
    }

    /// A read-write float.
    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::with_type(name, InterfaceType::Float).with_value(FeatureValue::Float(value))
    }

    /// A read-write boolean.
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::with_type(name, InterfaceType::Boolean).with_value(FeatureValue::Boolean(value))
    }

    /// A read-write string.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_type(name, InterfaceType::String).with_value(FeatureValue::String(value.into()))
    }

    /// A read-write enumeration currently set to `current`.
    pub fn enumeration<I, S>(name: impl Into<String>, entries: I, current: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::with_type(name, InterfaceType::Enumeration);
        node.entries = entries.into_iter().map(Into::into).collect();
        node.with_value(FeatureValue::Enumeration(current.into()))
    }

    /// A command. Commands are write-only.
    pub fn command(name: impl Into<String>) -> Self {
        Self::with_type(name, InterfaceType::Command).with_access(AccessMode::WriteOnly)
    }

    /// A read-only register.
    pub fn register(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::with_type(name, InterfaceType::Register)
            .with_value(FeatureValue::Register(bytes))
            .with_access(AccessMode::ReadOnly)
    }

    /// A node of an interface the tree does not render.
    pub fn other(name: impl Into<String>) -> Self {
        Self::with_type(name, InterfaceType::Other).with_access(AccessMode::ReadOnly)
    }

    /// Sets the access mode.
    pub fn with_access(self, access: AccessMode) -> Self {
        *self.access.write() = access;
        self
    }

    /// Sets the visibility tier.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the tooltip.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Removes the typed value so only the secondary text conversion answers.
    pub fn without_value(self) -> Self {
        *self.value.write() = None;
        self
    }

    /// Sets the secondary text conversion.
    pub fn string_fallback(mut self, text: impl Into<String>) -> Self {
        self.string_fallback = Some(text.into());
        self
    }

    /// Wraps the node for sharing with a tree.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Changes the access mode after construction, as a device would.
    pub fn set_access(&self, access: AccessMode) {
        *self.access.write() = access;
    }

    /// Replaces the stored value directly, bypassing access checks.
    pub fn force_value(&self, value: FeatureValue) {
        *self.value.write() = Some(value);
    }

    /// The stored value, regardless of access mode.
    pub fn stored_value(&self) -> Option<FeatureValue> {
        self.value.read().clone()
    }

    /// How many times the command ran.
    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// How many writes were accepted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_value(&self, value: &FeatureValue) -> FeatureResult<()> {
        match (self.interface, value) {
            (InterfaceType::Integer, FeatureValue::Integer(n)) => match self.bounds {
                Some(bounds) if !bounds.accepts(*n) => Err(FeatureError::InvalidValue(format!(
                    "{n} outside {}..={} step {}",
                    bounds.min, bounds.max, bounds.step
                ))),
                _ => Ok(()),
            },
            (InterfaceType::Enumeration, FeatureValue::Enumeration(symbol)) => {
                if self.entries.iter().any(|entry| entry == symbol) {
                    Ok(())
                } else {
                    Err(FeatureError::InvalidValue(format!("unknown entry {symbol:?}")))
                }
            }
            (InterfaceType::Float, FeatureValue::Float(_))
            | (InterfaceType::Boolean, FeatureValue::Boolean(_))
            | (InterfaceType::String, FeatureValue::String(_))
            | (InterfaceType::Register, FeatureValue::Register(_)) => Ok(()),
            (interface, other) => Err(FeatureError::InvalidValue(format!(
                "{other:?} is not a {interface} value"
            ))),
        }
    }
}

impl FeatureNode for MockFeature {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn interface_type(&self) -> InterfaceType {
        self.interface
    }

    fn access_mode(&self) -> AccessMode {
        *self.access.read()
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn tooltip(&self) -> Option<String> {
        self.tooltip.clone()
    }

    fn value(&self) -> FeatureResult<FeatureValue> {
        if !self.access_mode().is_readable() {
            return Err(FeatureError::NotReadable);
        }
        self.value.read().clone().ok_or(FeatureError::NotReadable)
    }

    fn to_string_value(&self) -> FeatureResult<String> {
        self.string_fallback.clone().ok_or(FeatureError::NotReadable)
    }

    fn set_value(&self, value: FeatureValue) -> FeatureResult<()> {
        if !self.access_mode().is_writable() {
            return Err(FeatureError::NotWritable);
        }
        self.check_value(&value)?;
        *self.value.write() = Some(value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn children(&self) -> Vec<FeatureRef> {
        self.children.clone()
    }

    fn execute(&self) -> FeatureResult<()> {
        if self.interface != InterfaceType::Command || !self.access_mode().is_writable() {
            return Err(FeatureError::NotExecutable);
        }
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn bounds(&self) -> Option<IntegerBounds> {
        self.bounds
    }

    fn entries(&self) -> Vec<String> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_write_respects_bounds() {
        let gain = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 2));
        assert_eq!(gain.set_value(FeatureValue::Integer(6)), Ok(()));
        assert_eq!(gain.value(), Ok(FeatureValue::Integer(6)));
        assert!(matches!(
            gain.set_value(FeatureValue::Integer(7)),
            Err(FeatureError::InvalidValue(_))
        ));
        assert_eq!(gain.write_count(), 1);
    }

    #[test]
    fn test_access_controls_reads_and_writes() {
        let note = MockFeature::string("Note", "hello").with_access(AccessMode::ReadOnly);
        assert_eq!(note.value(), Ok(FeatureValue::String("hello".into())));
        assert_eq!(
            note.set_value(FeatureValue::String("x".into())),
            Err(FeatureError::NotWritable)
        );

        note.set_access(AccessMode::NoAccess);
        assert_eq!(note.value(), Err(FeatureError::NotReadable));
    }

    #[test]
    fn test_command_execution() {
        let start = MockFeature::command("AcquisitionStart");
        assert_eq!(start.execute(), Ok(()));
        assert_eq!(start.execution_count(), 1);

        let not_a_command = MockFeature::float("ExposureTime", 10.0);
        assert_eq!(not_a_command.execute(), Err(FeatureError::NotExecutable));
    }

    #[test]
    fn test_enumeration_rejects_unknown_symbol() {
        let format = MockFeature::enumeration("PixelFormat", ["Mono8", "Mono12"], "Mono8");
        assert_eq!(format.entries(), vec!["Mono8".to_string(), "Mono12".to_string()]);
        assert!(format.set_value(FeatureValue::Enumeration("Mono12".into())).is_ok());
        assert!(format.set_value(FeatureValue::Enumeration("RGB8".into())).is_err());
    }

    #[test]
    fn test_category_children() {
        let child: FeatureRef = MockFeature::boolean("ReverseX", false).shared();
        let category = MockFeature::category("ImageFormatControl", vec![child]);
        assert_eq!(category.children().len(), 1);
        assert_eq!(category.value(), Err(FeatureError::NotReadable));
    }
}
