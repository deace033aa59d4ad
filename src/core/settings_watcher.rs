//! Settings file watcher
//!
//! Polls the settings file's modification time every 500 ms. When it moves
//! forward the file is re-read and merged into the [`ConfigChannel`]. A missing
//! file is waited for; an unreadable or invalid one is logged and the previous
//! settings stay in force.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::config::{AnalyzerSettings, SettingsRecord};
use super::config_channel::ConfigChannel;
use super::error::{ConfigError, ConfigResult};

pub const SETTINGS_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct SettingsWatcher {
    path: PathBuf,
    channel: ConfigChannel,
    interval: Duration,
    last_modified: Option<SystemTime>,
}

impl SettingsWatcher {
    /// Watch `path`; the file's current state counts as already applied
    pub fn new(path: impl Into<PathBuf>, channel: ConfigChannel) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            channel,
            interval: SETTINGS_POLL_INTERVAL,
            last_modified,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run on the tokio runtime until `stop` turns true
    pub fn spawn(self, stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(stop))
    }

    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        tracing::info!("[SETTINGS] Watching settings file {:?}", self.path);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                    continue;
                }
            }
            match self.poll() {
                Ok(Some(settings)) => log_applied(&settings),
                Ok(None) => {}
                Err(e) => tracing::warn!("[SETTINGS] Ignoring settings update: {e}"),
            }
        }
        tracing::debug!("[SETTINGS] Watcher stopped");
    }

    /// Apply the file if it changed since the last poll
    ///
    /// Returns the newly published settings, or `None` when nothing changed.
    pub fn poll(&mut self) -> ConfigResult<Option<std::sync::Arc<AnalyzerSettings>>> {
        let Some(current) = modified(&self.path) else {
            return Ok(None);
        };
        if self.last_modified.is_some_and(|last| current <= last) {
            return Ok(None);
        }
        self.last_modified = Some(current);

        tracing::info!("[SETTINGS] Settings file changed, reloading");
        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let record = SettingsRecord::from_json(&contents)?;
        self.channel.apply_record(&record).map(Some)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn log_applied(settings: &AnalyzerSettings) {
    tracing::info!(
        "[SETTINGS] Updated settings: enabled={}, side={}, elo={}, legit_mode={}",
        settings.enabled,
        settings.side,
        settings.elo,
        settings.legit.enabled
    );
}
