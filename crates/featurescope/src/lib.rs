//! featurescope - browse, filter and edit the features of a machine-vision
//! camera.
//!
//! This is the main crate. It re-exports `featurescope-core` (signals, the
//! polling thread and logging) and adds the feature model/view layer:
//!
//! - [`model`]: feature tree model, filter proxy, editors and tree dumps
//! - [`device`]: device selector state and tooltip text
//! - [`config`]: persistent viewer settings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use featurescope::config::ViewerConfig;
//! use featurescope::model::{FeatureFilterProxy, FeatureTreeModel, TreeDump};
//! use featurescope::PollingThread;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::load("viewer.toml")?;
//!
//!     // Features come from the device's node map.
//!     let source = Arc::new(FeatureTreeModel::empty());
//!     let proxy = FeatureFilterProxy::new(source.clone());
//!     config.apply_filter(&proxy);
//!     println!("{}", TreeDump::new().format(&*proxy));
//!
//!     let acquisition = PollingThread::with_config(config.polling_config()?);
//!     acquisition.set_worker(|| Ok(()));
//!     acquisition.start()?;
//!     acquisition.stop()?;
//!     Ok(())
//! }
//! ```

pub use featurescope_core::*;

pub mod config;
pub mod device;
pub mod error;
pub mod model;

pub use config::{DisplayRate, PollingSettings, ViewerConfig};
pub use device::{DeviceInfo, DeviceList, LABEL_SEPARATOR, compose_tooltip};
pub use error::{ConfigError, ConfigResult, FeatureError, FeatureResult};
