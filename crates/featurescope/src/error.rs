//! Error types for the feature model and viewer configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, writing or executing a camera feature.
///
/// Read-path errors never reach a view: the feature tree degrades them to
/// placeholder text. Write-path errors are returned per cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// The feature value cannot be read in its current state.
    #[error("feature is not readable")]
    NotReadable,

    /// The feature's access mode forbids any access.
    #[error("feature is not accessible")]
    NotAccessible,

    /// The feature's access mode or type forbids writing.
    #[error("feature is not writable")]
    NotWritable,

    /// The feature is not a command, or the command cannot run now.
    #[error("feature cannot be executed")]
    NotExecutable,

    /// Edit text could not be parsed into the feature's value type.
    #[error("cannot parse {input:?} as {expected}")]
    ParseFailure {
        /// The text that was committed.
        input: String,
        /// The value type the feature expects.
        expected: &'static str,
    },

    /// The value was parsed but the feature rejected it.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The index does not address a feature value cell.
    #[error("index does not address a feature value")]
    InvalidIndex,
}

/// Result type for feature operations.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Errors raised while loading or saving a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the configuration file failed.
    #[error("config I/O error for {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for a viewer configuration.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The polling cadence must be at least one microsecond.
    #[error("polling cadence must be at least 1 µs, got {0}")]
    InvalidCadence(u64),

    /// The text names no known display rate.
    #[error("unknown display rate {0:?}")]
    UnknownDisplayRate(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_error_display() {
        let err = FeatureError::ParseFailure {
            input: "abc".into(),
            expected: "float",
        };
        assert_eq!(err.to_string(), "cannot parse \"abc\" as float");
        assert_eq!(FeatureError::NotWritable.to_string(), "feature is not writable");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidCadence(0).to_string(),
            "polling cadence must be at least 1 µs, got 0"
        );
    }
}
