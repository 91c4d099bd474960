//! Viewer configuration.
//!
//! [`ViewerConfig`] holds the settings an operator expects to survive a
//! restart: the filter state of the feature tree, the display rate and the
//! acquisition polling parameters. It is stored as TOML; missing keys take
//! their defaults.
//!
//! ```toml
//! visibility = "Expert"
//! keyword = "exposure"
//! display_rate = "60 fps"
//!
//! [polling]
//! cadence_us = 1
//! thread_name = "featurescope-acquisition"
//! ```

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use featurescope_core::PollingConfig;
use featurescope_core::logging::targets;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{FeatureFilterProxy, Visibility};

/// Refresh rate of the image display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayRate {
    /// 30 frames per second.
    #[default]
    #[serde(rename = "30 fps")]
    Fps30,
    /// 60 frames per second.
    #[serde(rename = "60 fps")]
    Fps60,
}

impl DisplayRate {
    /// All rates in selector order.
    pub const ALL: [DisplayRate; 2] = [DisplayRate::Fps30, DisplayRate::Fps60];

    /// Selector label.
    pub fn label(self) -> &'static str {
        match self {
            DisplayRate::Fps30 => "30 fps",
            DisplayRate::Fps60 => "60 fps",
        }
    }

    /// Frames per second.
    pub fn fps(self) -> f64 {
        match self {
            DisplayRate::Fps30 => 30.0,
            DisplayRate::Fps60 => 60.0,
        }
    }

    /// Time between two displayed frames.
    pub fn frame_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps())
    }
}

impl fmt::Display for DisplayRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DisplayRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayRate::ALL
            .into_iter()
            .find(|rate| rate.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDisplayRate(s.to_string()))
    }
}

/// Acquisition polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Pause between two worker invocations, in microseconds. At least 1.
    pub cadence_us: u64,
    /// Name of the acquisition thread.
    pub thread_name: String,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            cadence_us: 1,
            thread_name: "featurescope-acquisition".to_string(),
        }
    }
}

/// Persistent viewer settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Visibility threshold of the feature tree.
    pub visibility: Visibility,
    /// Keyword filter of the feature tree.
    pub keyword: String,
    /// Image display rate.
    pub display_rate: DisplayRate,
    /// Acquisition polling.
    pub polling: PollingSettings,
}

impl ViewerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks values serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.polling.cadence_us == 0 {
            return Err(ConfigError::InvalidCadence(self.polling.cadence_us));
        }
        Ok(())
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "viewer config loaded");
        Ok(config)
    }

    /// Writes the configuration through a sibling temporary file and a
    /// rename, so a crash never leaves a truncated file behind. On failure
    /// the temporary file is removed and `path` is left as it was.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        self.validate()?;
        let text = self.to_toml_string()?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        let written = fs::File::create(tmp_path).and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
            drop(file);
            fs::rename(tmp_path, path)
        });
        if let Err(source) = written {
            if let Err(err) = fs::remove_file(tmp_path) {
                tracing::trace!(target: targets::CONFIG, %err, "no temporary file to remove");
            }
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::debug!(target: targets::CONFIG, path = %path.display(), "viewer config saved");
        Ok(())
    }

    /// The polling thread configuration these settings describe.
    pub fn polling_config(&self) -> ConfigResult<PollingConfig> {
        self.validate()?;
        Ok(PollingConfig::with_name(self.polling.thread_name.clone())
            .cadence_us(self.polling.cadence_us))
    }

    /// Applies the stored filter state to `proxy`.
    pub fn apply_filter(&self, proxy: &FeatureFilterProxy) {
        proxy.set_visibility(self.visibility);
        proxy.set_keyword(&self.keyword);
    }

    /// Records the filter state of `proxy`.
    pub fn capture_filter(&mut self, proxy: &FeatureFilterProxy) {
        self.visibility = proxy.visibility();
        self.keyword = proxy.keyword();
    }
}
