//! Shared, atomically swapped settings
//!
//! Writers publish whole [`AnalyzerSettings`] values; readers take an `Arc`
//! snapshot and keep using it for as long as they like. A reader never sees a
//! half-applied update.

use std::sync::Arc;

use parking_lot::RwLock;

use super::config::{AnalyzerSettings, SettingsRecord};
use super::error::ConfigResult;

#[derive(Debug, Clone, Default)]
pub struct ConfigChannel {
    current: Arc<RwLock<Arc<AnalyzerSettings>>>,
}

impl ConfigChannel {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(settings))),
        }
    }

    /// Settings in force right now
    pub fn snapshot(&self) -> Arc<AnalyzerSettings> {
        Arc::clone(&self.current.read())
    }

    /// Publish `settings`, returning the ones they replace
    pub fn replace(&self, settings: AnalyzerSettings) -> Arc<AnalyzerSettings> {
        std::mem::replace(&mut *self.current.write(), Arc::new(settings))
    }

    /// Edit a copy of the current settings and publish it
    pub fn update(&self, edit: impl FnOnce(&mut AnalyzerSettings)) -> Arc<AnalyzerSettings> {
        let mut guard = self.current.write();
        let mut next = AnalyzerSettings::clone(&guard);
        edit(&mut next);
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        next
    }

    /// Merge `record` over the current settings; on error nothing changes
    pub fn apply_record(&self, record: &SettingsRecord) -> ConfigResult<Arc<AnalyzerSettings>> {
        let mut guard = self.current.write();
        let next = Arc::new(guard.merged(record)?);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn test_snapshot_survives_replace() {
        //! A snapshot taken before an update keeps the old values
        let channel = ConfigChannel::new(AnalyzerSettings::default());
        let before = channel.snapshot();
        let updated = channel.update(|s| s.side = Color::Black);

        assert_eq!(before.side, Color::White);
        assert_eq!(updated.side, Color::Black);
        assert_eq!(channel.snapshot().side, Color::Black);
    }

    #[test]
    fn test_rejected_record_keeps_previous() {
        let channel = ConfigChannel::new(AnalyzerSettings::default());
        let record = SettingsRecord {
            elo: Some(1200),
            suboptimal_chance: Some(-0.1),
            ..Default::default()
        };
        assert!(channel.apply_record(&record).is_err());
        assert_eq!(*channel.snapshot(), AnalyzerSettings::default());
    }

    #[test]
    fn test_concurrent_swaps_are_atomic() {
        //! Writers flip side and elo together; readers must never see a mix
        let channel = ConfigChannel::new(AnalyzerSettings::default());
        let white = AnalyzerSettings::default();
        let black = AnalyzerSettings {
            side: Color::Black,
            elo: 1000,
            ..AnalyzerSettings::default()
        };

        std::thread::scope(|scope| {
            for _ in 0..2 {
                let channel = channel.clone();
                let (white, black) = (white.clone(), black.clone());
                scope.spawn(move || {
                    for i in 0..2000 {
                        channel.replace(if i % 2 == 0 { black.clone() } else { white.clone() });
                    }
                });
            }
            for _ in 0..2 {
                let channel = channel.clone();
                scope.spawn(move || {
                    for _ in 0..2000 {
                        let seen = channel.snapshot();
                        let consistent = matches!((seen.side, seen.elo), (Color::White, 2000) | (Color::Black, 1000));
                        assert!(consistent, "torn settings: {:?} {}", seen.side, seen.elo);
                    }
                });
            }
        });
    }
}
