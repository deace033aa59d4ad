//! Core infrastructure: settings, their validation and live reloading
//!
//! - [`AnalyzerSettings`] - complete validated configuration
//! - [`ConfigChannel`] - shared settings swapped atomically between tasks
//! - [`SettingsWatcher`] - polls the settings file and publishes changes

pub mod config;
pub mod config_channel;
pub mod error;
pub mod settings_watcher;

pub use config::{AnalyzerSettings, ArrowColor, LegitModeConfig, SettingsRecord};
pub use config_channel::ConfigChannel;
pub use error::{ConfigError, ConfigResult};
pub use settings_watcher::SettingsWatcher;
