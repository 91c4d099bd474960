//! The camera feature protocol consumed by the feature tree.
//!
//! A camera exposes its runtime configuration as a graph of feature nodes.
//! The tree model never owns that graph; it holds [`FeatureRef`] handles and
//! re-reads metadata and values through the [`FeatureNode`] trait on every
//! query, so a value changed by the device shows up on the next repaint.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

/// Shared handle to one camera feature.
pub type FeatureRef = Arc<dyn FeatureNode>;

/// Interface type tag of a feature node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    /// Grouping node; has children, never a value.
    Category,
    /// Boolean flag.
    Boolean,
    /// Integer with bounds and increment.
    Integer,
    /// Floating point value.
    Float,
    /// Free text.
    String,
    /// One symbol out of an ordered entry list.
    Enumeration,
    /// Action that runs when executed.
    Command,
    /// Raw byte block.
    Register,
    /// Any interface the tree has no special handling for.
    Other,
}

impl InterfaceType {
    /// Whether the tree renders this type's value as data.
    pub fn has_readable_value(self) -> bool {
        matches!(
            self,
            InterfaceType::Boolean
                | InterfaceType::Enumeration
                | InterfaceType::Float
                | InterfaceType::Integer
                | InterfaceType::String
                | InterfaceType::Register
        )
    }

    /// Short lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            InterfaceType::Category => "category",
            InterfaceType::Boolean => "boolean",
            InterfaceType::Integer => "integer",
            InterfaceType::Float => "float",
            InterfaceType::String => "string",
            InterfaceType::Enumeration => "enumeration",
            InterfaceType::Command => "command",
            InterfaceType::Register => "register",
            InterfaceType::Other => "other",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Access mode of a feature in the device's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Read and write.
    ReadWrite,
    /// Read only.
    ReadOnly,
    /// Write only.
    WriteOnly,
    /// Temporarily not available.
    NoAccess,
    /// Not implemented by this device.
    NotImplemented,
}

impl AccessMode {
    /// `ReadWrite` or `ReadOnly`.
    pub fn is_readable(self) -> bool {
        matches!(self, AccessMode::ReadWrite | AccessMode::ReadOnly)
    }

    /// `ReadWrite` or `WriteOnly`.
    pub fn is_writable(self) -> bool {
        matches!(self, AccessMode::ReadWrite | AccessMode::WriteOnly)
    }
}

/// Disclosure tier of a feature, ordered `Beginner < Expert < Guru < Invisible`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Visibility {
    /// Shown to everyone.
    #[default]
    Beginner,
    /// Shown to experienced operators.
    Expert,
    /// Shown to integrators.
    Guru,
    /// Never shown by default.
    Invisible,
}

impl Visibility {
    /// All tiers, lowest first.
    pub const ALL: [Visibility; 4] = [
        Visibility::Beginner,
        Visibility::Expert,
        Visibility::Guru,
        Visibility::Invisible,
    ];

    /// The label shown in a visibility selector.
    pub fn label(self) -> &'static str {
        match self {
            Visibility::Beginner => "Beginner",
            Visibility::Expert => "Expert",
            Visibility::Guru => "Guru",
            Visibility::Invisible => "Invisible",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Visibility {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visibility::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeatureError::ParseFailure {
                input: s.to_string(),
                expected: "visibility",
            })
    }
}

/// Inclusive integer range with an increment, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerBounds {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
    /// Increment between accepted values.
    pub step: i64,
}

impl IntegerBounds {
    /// Creates bounds; a non-positive step is treated as 1.
    pub fn new(min: i64, max: i64, step: i64) -> Self {
        Self {
            min,
            max: max.max(min),
            step: step.max(1),
        }
    }

    /// Clamps `value` into the range and snaps it onto the `min + k * step`
    /// grid, rounding to the nearest accepted value.
    pub fn constrain(&self, value: i64) -> i64 {
        let step = self.step.max(1) as i128;
        let min = self.min as i128;
        let max = self.max as i128;
        let clamped = (value as i128).clamp(min, max);

        let offset = clamped - min;
        let mut snapped = min + ((offset + step / 2) / step) * step;
        if snapped > max {
            snapped -= step;
        }
        snapped as i64
    }

    /// Whether `value` is inside the range and on the step grid.
    pub fn accepts(&self, value: i64) -> bool {
        self.constrain(value) == value
    }
}

/// A typed feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Boolean flag, displayed as `True` / `False`.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Free text.
    String(String),
    /// Current enumeration symbol.
    Enumeration(String),
    /// Raw register bytes, displayed as lowercase hex.
    Register(Vec<u8>),
}

impl FeatureValue {
    /// Converts committed edit text into a value for a feature of `interface`.
    ///
    /// Boolean accepts `true` in any letter case and treats every other text
    /// as false. Float and Integer must parse completely. Everything else
    /// (Enumeration aside) is passed through as text for the node to judge.
    pub fn from_edit_text(interface: InterfaceType, raw: &str) -> FeatureResult<Self> {
        match interface {
            InterfaceType::Boolean => Ok(FeatureValue::Boolean(raw.trim().eq_ignore_ascii_case("true"))),
            InterfaceType::Float => raw
                .trim()
                .parse::<f64>()
                .map(FeatureValue::Float)
                .map_err(|_| FeatureError::ParseFailure {
                    input: raw.to_string(),
                    expected: "float",
                }),
            InterfaceType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FeatureValue::Integer)
                .map_err(|_| FeatureError::ParseFailure {
                    input: raw.to_string(),
                    expected: "integer",
                }),
            InterfaceType::Enumeration => Ok(FeatureValue::Enumeration(raw.to_string())),
            InterfaceType::Category | InterfaceType::Command => Err(FeatureError::NotWritable),
            InterfaceType::String
            | InterfaceType::Register
            | InterfaceType::Other => Ok(FeatureValue::String(raw.to_string())),
        }
    }

    /// The value as text, as shown in the value column.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Boolean(true) => f.write_str("True"),
            FeatureValue::Boolean(false) => f.write_str("False"),
            FeatureValue::Integer(n) => write!(f, "{n}"),
            FeatureValue::Float(x) => {
                // Whole numbers keep one decimal so the text still reads as a float.
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            FeatureValue::String(s) | FeatureValue::Enumeration(s) => f.write_str(s),
            FeatureValue::Register(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Handle protocol for one node of a camera's feature graph.
///
/// Implementations wrap whatever the device access layer provides. Only the
/// metadata methods are required; value access defaults to "not available"
/// so category and command nodes stay short.
///
/// The graph must be acyclic: categories are expanded recursively when the
/// tree is built.
pub trait FeatureNode: Send + Sync {
    /// Name shown in the first column.
    fn display_name(&self) -> String;

    /// Interface type tag.
    fn interface_type(&self) -> InterfaceType;

    /// Access mode in the device's current state.
    fn access_mode(&self) -> AccessMode;

    /// Disclosure tier.
    fn visibility(&self) -> Visibility;

    /// Hover text, if any.
    fn tooltip(&self) -> Option<String> {
        None
    }

    /// Current typed value.
    fn value(&self) -> FeatureResult<FeatureValue> {
        Err(FeatureError::NotReadable)
    }

    /// Secondary textual conversion used when [`value`](Self::value) fails.
    fn to_string_value(&self) -> FeatureResult<String> {
        Err(FeatureError::NotReadable)
    }

    /// Writes a new value.
    fn set_value(&self, _value: FeatureValue) -> FeatureResult<()> {
        Err(FeatureError::NotWritable)
    }

    /// Ordered child features (categories only).
    fn children(&self) -> Vec<FeatureRef> {
        Vec::new()
    }

    /// Runs the command (commands only).
    fn execute(&self) -> FeatureResult<()> {
        Err(FeatureError::NotExecutable)
    }

    /// Integer range (integers only).
    fn bounds(&self) -> Option<IntegerBounds> {
        None
    }

    /// Ordered symbolic entries (enumerations only).
    fn entries(&self) -> Vec<String> {
        Vec::new()
    }
}

impl fmt::Debug for dyn FeatureNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureNode")
            .field("name", &self.display_name())
            .field("type", &self.interface_type())
            .field("access", &self.access_mode())
            .field("visibility", &self.visibility())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_order() {
        assert!(Visibility::Beginner < Visibility::Expert);
        assert!(Visibility::Expert < Visibility::Guru);
        assert!(Visibility::Guru < Visibility::Invisible);
        assert_eq!("guru".parse::<Visibility>(), Ok(Visibility::Guru));
        assert!("wizard".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_access_mode() {
        assert!(AccessMode::ReadOnly.is_readable());
        assert!(!AccessMode::ReadOnly.is_writable());
        assert!(AccessMode::WriteOnly.is_writable());
        assert!(!AccessMode::WriteOnly.is_readable());
        assert!(!AccessMode::NoAccess.is_readable());
        assert!(!AccessMode::NotImplemented.is_writable());
    }

    #[test]
    fn test_readable_types() {
        assert!(InterfaceType::Register.has_readable_value());
        assert!(!InterfaceType::Command.has_readable_value());
        assert!(!InterfaceType::Category.has_readable_value());
        assert!(!InterfaceType::Other.has_readable_value());
    }

    #[test]
    fn test_bounds_constrain() {
        let bounds = IntegerBounds::new(0, 10, 4);
        assert_eq!(bounds.constrain(-3), 0);
        assert_eq!(bounds.constrain(5), 4);
        assert_eq!(bounds.constrain(6), 8);
        // 10 is out of the grid; the largest accepted value is 8
        assert_eq!(bounds.constrain(42), 8);
        assert!(bounds.accepts(8));
        assert!(!bounds.accepts(9));

        assert_eq!(IntegerBounds::new(0, 10, 0).step, 1);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Boolean(true).to_string(), "True");
        assert_eq!(FeatureValue::Float(10.0).to_string(), "10.0");
        assert_eq!(FeatureValue::Float(0.25).to_string(), "0.25");
        assert_eq!(FeatureValue::Register(vec![0x0a, 0xff]).to_string(), "0aff");
        assert_eq!(FeatureValue::Enumeration("Mono8".into()).to_string(), "Mono8");
    }

    #[test]
    fn test_from_edit_text() {
        assert_eq!(
            FeatureValue::from_edit_text(InterfaceType::Boolean, "TRUE"),
            Ok(FeatureValue::Boolean(true))
        );
        assert_eq!(
            FeatureValue::from_edit_text(InterfaceType::Boolean, "yes"),
            Ok(FeatureValue::Boolean(false))
        );
        assert_eq!(
            FeatureValue::from_edit_text(InterfaceType::Float, " 2.5 "),
            Ok(FeatureValue::Float(2.5))
        );
        assert!(matches!(
            FeatureValue::from_edit_text(InterfaceType::Integer, "4.5"),
            Err(FeatureError::ParseFailure { expected: "integer", .. })
        ));
        assert_eq!(
            FeatureValue::from_edit_text(InterfaceType::Category, "x"),
            Err(FeatureError::NotWritable)
        );
    }
}
