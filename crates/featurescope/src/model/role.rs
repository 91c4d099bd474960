//! Data roles for item models.
//!
//! Roles define what aspect of a cell is being requested or set. The feature
//! tree answers the display text, the tooltip, the category style colors and
//! the raw edit text of a cell.

use std::fmt;

/// Standard roles for accessing different aspects of a cell.
///
/// - **Display**: the text shown in the cell
/// - **Edit**: the value handed to an editor, and the role commits use
/// - **ToolTip**: text shown when hovering over the cell
/// - **BackgroundColor** / **ForegroundColor**: style hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text to display. Returns `String`.
    Display,
    /// Value for editing. Returns `String`.
    Edit,
    /// Tooltip text shown on hover. Returns `String`.
    ToolTip,
    /// Background color of the row. Returns `Color`.
    BackgroundColor,
    /// Foreground (text) color of the row. Returns `Color`.
    ForegroundColor,
}

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Container for cell data returned by `ItemModel::data`.
///
/// # Example
///
/// ```
/// use featurescope::model::ItemData;
///
/// let data = ItemData::from("ExposureTime");
/// assert_eq!(data.as_string(), Some("ExposureTime"));
/// assert!(ItemData::None.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data (for Display, ToolTip, Edit).
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Color data.
    Color(Color),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as a color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            ItemData::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Text form used when the data is committed to a feature.
    ///
    /// Numbers and booleans are rendered the way the feature tree displays
    /// them; colors and `None` have no text form.
    pub fn to_edit_text(&self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s.clone()),
            ItemData::Int(n) => Some(n.to_string()),
            ItemData::Float(n) => Some(n.to_string()),
            ItemData::Bool(true) => Some("True".to_string()),
            ItemData::Bool(false) => Some("False".to_string()),
            ItemData::Color(_) | ItemData::None => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(value: String) -> Self {
        ItemData::String(value)
    }
}

impl From<&str> for ItemData {
    fn from(value: &str) -> Self {
        ItemData::String(value.to_string())
    }
}

impl From<&String> for ItemData {
    fn from(value: &String) -> Self {
        ItemData::String(value.clone())
    }
}

impl From<i64> for ItemData {
    fn from(value: i64) -> Self {
        ItemData::Int(value)
    }
}

impl From<f64> for ItemData {
    fn from(value: f64) -> Self {
        ItemData::Float(value)
    }
}

impl From<bool> for ItemData {
    fn from(value: bool) -> Self {
        ItemData::Bool(value)
    }
}

impl From<Color> for ItemData {
    fn from(value: Color) -> Self {
        ItemData::Color(value)
    }
}

impl<T: Into<ItemData>> From<Option<T>> for ItemData {
    fn from(value: Option<T>) -> Self {
        value.map_or(ItemData::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_data_conversions() {
        assert_eq!(ItemData::from("Gain").as_string(), Some("Gain"));
        assert_eq!(ItemData::from(String::from("x")).into_string(), Some("x".into()));
        assert_eq!(ItemData::from(Some(Color::WHITE)).as_color(), Some(Color::WHITE));
        assert!(ItemData::from(None::<String>).is_none());
        assert!(ItemData::from(7i64).is_some());
    }

    #[test]
    fn test_edit_text() {
        assert_eq!(ItemData::Bool(true).to_edit_text().as_deref(), Some("True"));
        assert_eq!(ItemData::Int(-4).to_edit_text().as_deref(), Some("-4"));
        assert_eq!(ItemData::Float(1.5).to_edit_text().as_deref(), Some("1.5"));
        assert_eq!(ItemData::Color(Color::WHITE).to_edit_text(), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgba(56, 147, 189, 1).to_string(), "#3893bd01");
        assert_eq!(Color::WHITE.to_string(), "#ffffffff");
    }
}
