//! Analyzer settings
//!
//! [`AnalyzerSettings`] is the complete, validated configuration read by the
//! pipeline. External edits arrive as a [`SettingsRecord`] in which every field
//! is optional; a record is merged over the current settings and validated as
//! a whole, so a bad field rejects the entire update.
//!
//! # File format
//!
//! ```json
//! {
//!   "enabled": true,
//!   "side": "white",
//!   "elo": 2000,
//!   "arrow_color": "#0080FF",
//!   "legit_mode": false,
//!   "blunder_chance": 0.15,
//!   "suboptimal_chance": 0.35
//! }
//! ```
//!
//! camelCase spellings (`arrowColor`, `legitMode`, ...) are accepted as well.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::board::Color;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

const PROJECT_QUALIFIER: &str = "org";
const PROJECT_ORGANIZATION: &str = "boardwatch";
const PROJECT_APPLICATION: &str = "boardwatch";

pub const DEFAULT_ELO: i32 = 2000;

/// Opacity used when rendering suggestion arrows
pub const ARROW_ALPHA: f32 = 0.8;

/// Suggestion arrow colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArrowColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ArrowColor {
    pub const DEFAULT: ArrowColor = ArrowColor { r: 0x00, g: 0x80, b: 0xFF };

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn parse(input: &str) -> ConfigResult<Self> {
        let invalid = || ConfigError::InvalidColor {
            input: input.to_owned(),
        };
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// `rgba(r, g, b, 0.8)` for overlay renderers
    pub fn rgba(&self) -> String {
        format!("rgba({}, {}, {}, {ARROW_ALPHA})", self.r, self.g, self.b)
    }
}

impl Default for ArrowColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ArrowColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for ArrowColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ArrowColor> for String {
    fn from(color: ArrowColor) -> Self {
        color.to_string()
    }
}

/// Human-likeness tuning
///
/// `skill_variance`, `consistency` and `elo_variance` are accepted and stored
/// but do not influence selection yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegitModeConfig {
    pub enabled: bool,
    pub blunder_chance: f32,
    pub suboptimal_chance: f32,
    pub skill_variance: f32,
    pub consistency: u8,
    pub elo_variance: i32,
}

impl Default for LegitModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            blunder_chance: 0.15,
            suboptimal_chance: 0.35,
            skill_variance: 0.2,
            consistency: 70,
            elo_variance: 200,
        }
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Analysis on/off
    pub enabled: bool,
    /// Side the user plays; analysis runs on this side's turns
    pub side: Color,
    /// Target engine strength, clamped to the supported range
    pub elo: i32,
    pub arrow_color: ArrowColor,
    pub legit: LegitModeConfig,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            side: Color::White,
            elo: DEFAULT_ELO,
            arrow_color: ArrowColor::DEFAULT,
            legit: LegitModeConfig::default(),
        }
    }
}

/// Partial settings update, as written by an external settings editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo: Option<i32>,
    #[serde(alias = "arrowColor", skip_serializing_if = "Option::is_none")]
    pub arrow_color: Option<String>,
    #[serde(alias = "legitMode", skip_serializing_if = "Option::is_none")]
    pub legit_mode: Option<bool>,
    #[serde(alias = "blunderChance", skip_serializing_if = "Option::is_none")]
    pub blunder_chance: Option<f32>,
    #[serde(alias = "suboptimalChance", skip_serializing_if = "Option::is_none")]
    pub suboptimal_chance: Option<f32>,
    #[serde(alias = "skillVariance", skip_serializing_if = "Option::is_none")]
    pub skill_variance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<u8>,
    #[serde(alias = "eloVariance", skip_serializing_if = "Option::is_none")]
    pub elo_variance: Option<i32>,
}

impl SettingsRecord {
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl AnalyzerSettings {
    /// Overlay `record` on these settings and validate the result
    pub fn merged(&self, record: &SettingsRecord) -> ConfigResult<Self> {
        let mut next = self.clone();

        if let Some(enabled) = record.enabled {
            next.enabled = enabled;
        }
        if let Some(side) = record.side {
            next.side = side;
        }
        if let Some(elo) = record.elo {
            next.elo = uci_engine::clamp_elo(elo);
            if next.elo != elo {
                tracing::warn!("[SETTINGS] ELO {} clamped to {}", elo, next.elo);
            }
        }
        if let Some(color) = &record.arrow_color {
            next.arrow_color = ArrowColor::parse(color)?;
        }

        let legit = &mut next.legit;
        if let Some(enabled) = record.legit_mode {
            legit.enabled = enabled;
        }
        if let Some(chance) = record.blunder_chance {
            legit.blunder_chance = probability("blunder_chance", chance)?;
        }
        if let Some(chance) = record.suboptimal_chance {
            legit.suboptimal_chance = probability("suboptimal_chance", chance)?;
        }
        if let Some(variance) = record.skill_variance {
            legit.skill_variance = variance;
        }
        if let Some(consistency) = record.consistency {
            legit.consistency = consistency;
        }
        if let Some(variance) = record.elo_variance {
            legit.elo_variance = variance;
        }

        Ok(next)
    }

    /// Full record describing these settings
    pub fn to_record(&self) -> SettingsRecord {
        SettingsRecord {
            enabled: Some(self.enabled),
            side: Some(self.side),
            elo: Some(self.elo),
            arrow_color: Some(self.arrow_color.to_string()),
            legit_mode: Some(self.legit.enabled),
            blunder_chance: Some(self.legit.blunder_chance),
            suboptimal_chance: Some(self.legit.suboptimal_chance),
            skill_variance: Some(self.legit.skill_variance),
            consistency: Some(self.legit.consistency),
            elo_variance: Some(self.legit.elo_variance),
        }
    }
}

fn probability(field: &'static str, value: f32) -> ConfigResult<f32> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: f64::from(value),
        })
    }
}

/// `settings.json` in the user's configuration directory, or the working
/// directory when no home directory can be determined
pub fn default_settings_path() -> PathBuf {
    match ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORGANIZATION, PROJECT_APPLICATION) {
        Some(dirs) => dirs.config_dir().join(SETTINGS_FILENAME),
        None => PathBuf::from(SETTINGS_FILENAME),
    }
}

/// Read a settings file and merge it over `base`
pub fn load_settings(path: &Path, base: &AnalyzerSettings) -> ConfigResult<AnalyzerSettings> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = SettingsRecord::from_json(&contents)?;
    base.merged(&record)
}

/// Write `settings` as a complete record, creating parent directories
///
/// The record goes to a sibling temp file that is then renamed over `path`,
/// so a concurrent reader sees either the old file or the new one.
pub fn save_settings(path: &Path, settings: &AnalyzerSettings) -> ConfigResult<()> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(&settings.to_record())?;
    let staging = staging_path(path);
    fs::write(&staging, json).map_err(io_error)?;
    fs::rename(&staging, path).map_err(io_error)?;
    tracing::info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| SETTINGS_FILENAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// [`save_settings`] on the blocking thread pool
pub async fn save_settings_async(path: PathBuf, settings: AnalyzerSettings) -> ConfigResult<()> {
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || save_settings(&task_path, &settings))
        .await
        .map_err(|e| ConfigError::Io {
            path,
            source: std::io::Error::other(e),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_color_parsing() {
        let color = ArrowColor::parse("#0080FF").unwrap();
        assert_eq!(color, ArrowColor::DEFAULT);
        assert_eq!(color.rgba(), "rgba(0, 128, 255, 0.8)");
        assert_eq!(color.to_string(), "#0080FF");
        assert_eq!(ArrowColor::parse("ff0000").unwrap().r, 255);

        for bad in ["", "#12345", "#GGGGGG", "#1234567", "#ééé"] {
            assert!(matches!(ArrowColor::parse(bad), Err(ConfigError::InvalidColor { .. })), "{bad:?}");
        }
    }

    #[test]
    fn test_partial_record_merges_over_current() {
        //! Fields absent from the record keep their current values
        let current = AnalyzerSettings::default();
        let record = SettingsRecord::from_json(r#"{"side": "black", "legitMode": true}"#).unwrap();
        let merged = current.merged(&record).unwrap();

        assert_eq!(merged.side, Color::Black);
        assert!(merged.legit.enabled);
        assert_eq!(merged.elo, current.elo);
        assert_eq!(merged.legit.blunder_chance, current.legit.blunder_chance);
    }

    #[test]
    fn test_elo_is_clamped() {
        let current = AnalyzerSettings::default();
        let high = current.merged(&SettingsRecord { elo: Some(5000), ..Default::default() }).unwrap();
        assert_eq!(high.elo, 3200);
        let low = current.merged(&SettingsRecord { elo: Some(-10), ..Default::default() }).unwrap();
        assert_eq!(low.elo, 0);
    }

    #[test]
    fn test_invalid_fields_reject_whole_update() {
        let current = AnalyzerSettings::default();
        let record = SettingsRecord {
            side: Some(Color::Black),
            blunder_chance: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            current.merged(&record),
            Err(ConfigError::OutOfRange { field: "blunder_chance", .. })
        ));

        let record = SettingsRecord::from_json(r##"{"arrow_color": "#nothex"}"##).unwrap();
        assert!(matches!(current.merged(&record), Err(ConfigError::InvalidColor { .. })));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(SettingsRecord::from_json("{not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(SettingsRecord::from_json(r#"{"side": "green"}"#), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("boardwatch_settings_{}", std::process::id()))
            .join(SETTINGS_FILENAME);
        let settings = AnalyzerSettings {
            side: Color::Black,
            elo: 1500,
            ..AnalyzerSettings::default()
        };
        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path, &AnalyzerSettings::default()).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_async_save_replaces_file_without_leftovers() {
        //! A save overwrites the previous record and leaves no staging file
        let dir = std::env::temp_dir().join(format!("boardwatch_async_settings_{}", std::process::id()));
        let path = dir.join(SETTINGS_FILENAME);
        save_settings(&path, &AnalyzerSettings::default()).unwrap();

        let updated = AnalyzerSettings {
            side: Color::Black,
            ..AnalyzerSettings::default()
        };
        save_settings_async(path.clone(), updated.clone()).await.unwrap();

        assert_eq!(load_settings(&path, &AnalyzerSettings::default()).unwrap(), updated);
        assert!(!staging_path(&path).exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_settings_path_is_boardwatch_config() {
        let path = default_settings_path();
        assert_eq!(path.file_name().unwrap(), SETTINGS_FILENAME);
        if let Some(dirs) = ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORGANIZATION, PROJECT_APPLICATION) {
            assert_eq!(path.parent().unwrap(), dirs.config_dir());
            assert!(path.to_string_lossy().contains("boardwatch"));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("boardwatch_definitely_missing.json");
        assert!(matches!(
            load_settings(&path, &AnalyzerSettings::default()),
            Err(ConfigError::Io { .. })
        ));
    }
}
