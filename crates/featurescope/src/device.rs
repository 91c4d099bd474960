//! Device selector state.
//!
//! The acquisition layer reports the devices it discovered as
//! [`DeviceInfo`] records. [`DeviceList`] keeps the latest list, remembers
//! whether it was revised since the selector last read it, and decides
//! whether the selector can be used at all.

use serde::{Deserialize, Serialize};

use featurescope_core::logging::targets;

/// Separator between the fields of a device label.
pub const LABEL_SEPARATOR: &str = "::";

/// Identity of one discovered device.
///
/// Serial number and user-defined name are optional on many transport
/// layers; absent and empty values are simply left out of the label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub vendor: String,
    /// Model name.
    pub model: String,
    /// Serial number, when the transport layer reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// User-assigned name, when the transport layer reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined_name: Option<String>,
}

impl DeviceInfo {
    /// A device known by vendor and model only.
    pub fn new(vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            serial_number: None,
            user_defined_name: None,
        }
    }

    /// Sets the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Sets the user-defined name.
    pub fn with_user_defined_name(mut self, name: impl Into<String>) -> Self {
        self.user_defined_name = Some(name.into());
        self
    }

    /// `vendor::model[::serial][::user name]`.
    ///
    /// ```
    /// use featurescope::DeviceInfo;
    ///
    /// let camera = DeviceInfo::new("Acme", "VX-100").with_serial_number("0042");
    /// assert_eq!(camera.display_label(), "Acme::VX-100::0042");
    /// ```
    pub fn display_label(&self) -> String {
        let mut label = format!("{}{LABEL_SEPARATOR}{}", self.vendor, self.model);
        for field in [&self.serial_number, &self.user_defined_name] {
            if let Some(value) = field.as_deref().filter(|value| !value.is_empty()) {
                label.push_str(LABEL_SEPARATOR);
                label.push_str(value);
            }
        }
        label
    }
}

/// Devices offered by the selector.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    devices: Vec<DeviceInfo>,
    revised: bool,
    files_loaded: bool,
    acquirer_open: bool,
}

impl DeviceList {
    /// An empty list with no device files loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the device list and marks it revised.
    pub fn update(&mut self, devices: Vec<DeviceInfo>) {
        tracing::debug!(target: targets::DEVICE, count = devices.len(), "device list revised");
        self.devices = devices;
        self.revised = true;
    }

    /// Whether the list changed since [`take_revised_labels`](Self::take_revised_labels)
    /// last ran.
    pub fn is_revised(&self) -> bool {
        self.revised
    }

    /// Labels of the current devices if the list was revised, clearing the
    /// flag. `None` means the selector can keep its entries.
    pub fn take_revised_labels(&mut self) -> Option<Vec<String>> {
        if !std::mem::take(&mut self.revised) {
            return None;
        }
        Some(self.labels())
    }

    /// Labels of the current devices.
    pub fn labels(&self) -> Vec<String> {
        self.devices.iter().map(DeviceInfo::display_label).collect()
    }

    /// The current devices.
    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    /// Device at selector position `index`.
    pub fn get(&self, index: usize) -> Option<&DeviceInfo> {
        self.devices.get(index)
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device was discovered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Records whether producer files are loaded.
    pub fn set_files_loaded(&mut self, loaded: bool) {
        self.files_loaded = loaded;
    }

    /// Records whether an image acquirer is open.
    pub fn set_acquirer_open(&mut self, open: bool) {
        self.acquirer_open = open;
    }

    /// The selector is usable once producer files are loaded and while no
    /// acquirer is open.
    pub fn selector_enabled(&self) -> bool {
        self.files_loaded && !self.acquirer_open
    }
}

/// Tooltip text: `description`, followed by ` (shortcut)` when given.
///
/// ```
/// use featurescope::compose_tooltip;
///
/// assert_eq!(compose_tooltip("Start acquisition", Some("Ctrl+J")), "Start acquisition (Ctrl+J)");
/// assert_eq!(compose_tooltip("Start acquisition", None), "Start acquisition");
/// ```
pub fn compose_tooltip(description: &str, shortcut: Option<&str>) -> String {
    match shortcut {
        Some(shortcut) => format!("{description} ({shortcut})"),
        None => description.to_string(),
    }
}
