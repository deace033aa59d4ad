//! The polling loop
//!
//! [`FaultRecoveryLoop`] owns the pipeline state and every collaborator. One
//! tick takes a settings snapshot, drains the command queue, runs a cycle and
//! turns a failed cycle into a recovery action. Ticks are strictly sequential,
//! so at most one engine query is ever in flight.
//!
//! Only the stop signal ends [`FaultRecoveryLoop::run`]. On the way out the
//! presenter is cleared and the engine is shut down with a bounded grace
//! period.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::commands::{self, Command, CommandReceiver};
use super::context::PipelineContext;
use super::cycle::CycleReport;
use super::recovery::{FaultKind, RecoveryAction};
use super::sources::{AnalyzerLauncher, MoveLogProvider, PositionAnalyzer, Presenter, SnapshotProvider};
use crate::core::config::{save_settings_async, AnalyzerSettings};
use crate::core::ConfigChannel;
use crate::io::StatusLine;
use crate::selection::SelectionDraws;

/// Timing and sizing of the loop
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Pause between cycles
    pub poll_interval: Duration,
    /// Engine think time per analysis
    pub think_time: Duration,
    /// Engine lines requested per analysis
    pub candidates: usize,
    /// How long the engine gets to quit on shutdown
    pub engine_grace: Duration,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            think_time: Duration::from_millis(100),
            candidates: 5,
            engine_grace: Duration::from_secs(2),
        }
    }
}

pub struct FaultRecoveryLoop<D: SelectionDraws> {
    pub(super) ctx: PipelineContext,
    pub(super) config: ConfigChannel,
    pub(super) snapshots: Box<dyn SnapshotProvider>,
    pub(super) move_log: Box<dyn MoveLogProvider>,
    pub(super) presenter: Box<dyn Presenter>,
    pub(super) engine: Option<Box<dyn PositionAnalyzer>>,
    pub(super) status: Option<StatusLine<Box<dyn Write + Send>>>,
    pub(super) draws: D,
    pub(super) options: LoopOptions,
    launcher: Option<Arc<dyn AnalyzerLauncher>>,
    commands: Option<CommandReceiver>,
    settings_file: Option<PathBuf>,
}

impl<D: SelectionDraws> FaultRecoveryLoop<D> {
    pub fn new(
        config: ConfigChannel,
        snapshots: Box<dyn SnapshotProvider>,
        move_log: Box<dyn MoveLogProvider>,
        presenter: Box<dyn Presenter>,
        draws: D,
    ) -> Self {
        Self {
            ctx: PipelineContext::new(Instant::now()),
            config,
            snapshots,
            move_log,
            presenter,
            engine: None,
            status: None,
            draws,
            options: LoopOptions::default(),
            launcher: None,
            commands: None,
            settings_file: None,
        }
    }

    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Analyzer to use from the first cycle, already configured for
    /// `launched_elo`; `None` runs without analysis
    pub fn with_engine(mut self, engine: Option<Box<dyn PositionAnalyzer>>, launched_elo: i32) -> Self {
        self.ctx.applied_elo = engine.is_some().then_some(launched_elo);
        self.engine = engine;
        self
    }

    /// Used to start an analyzer again after a hard recovery
    pub fn with_launcher(mut self, launcher: Arc<dyn AnalyzerLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_commands(mut self, commands: CommandReceiver) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_status(mut self, out: Box<dyn Write + Send>) -> Self {
        self.status = Some(StatusLine::new(out));
        self
    }

    /// Persist command-driven settings changes to this file
    pub fn with_settings_file(mut self, path: PathBuf) -> Self {
        self.settings_file = Some(path);
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Tick every `poll_interval` until `stop` turns true, then tear down
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        tracing::info!("[LOOP] Monitoring started");
        loop {
            if *stop.borrow() {
                break;
            }
            self.tick(Instant::now()).await;

            tokio::select! {
                _ = tokio::time::sleep(self.options.poll_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        self.shutdown().await;
    }

    /// One cycle with fault handling
    pub async fn tick(&mut self, now: Instant) -> Option<CycleReport> {
        self.apply_commands().await;
        let settings = self.config.snapshot();
        self.sync_settings(&settings).await;

        match self.run_cycle(&settings).await {
            Ok(report) => {
                self.ctx.recovery.record_success();
                Some(report)
            }
            Err(error) => {
                let kind = FaultKind::classify(&error);
                let action = self.ctx.recovery.record_fault(kind, now);
                tracing::warn!(
                    "[RECOVERY] {kind:?} fault (crash #{}): {error}",
                    self.ctx.recovery.total_crash_count()
                );
                self.perform(action, now).await;
                None
            }
        }
    }

    async fn apply_commands(&mut self) {
        let Some(receiver) = &self.commands else {
            return;
        };
        for command in commands::drain(receiver) {
            match command {
                Command::SwitchSide => {
                    let settings = self.config.update(|s| s.side = s.side.opposite());
                    tracing::info!("[LOOP] Switched analysis side to {}", settings.side);
                    self.persist(&settings).await;
                }
                Command::ToggleLegitMode => {
                    let settings = self.config.update(|s| s.legit.enabled = !s.legit.enabled);
                    let state = if settings.legit.enabled { "enabled" } else { "disabled" };
                    tracing::info!("[LOOP] Legit mode {state}");
                    self.persist(&settings).await;
                }
                Command::ClearAnnotations => self.clear_presenter().await,
            }
        }
    }

    async fn persist(&mut self, settings: &AnalyzerSettings) {
        let Some(path) = self.settings_file.clone() else {
            return;
        };
        if let Err(e) = save_settings_async(path, settings.clone()).await {
            tracing::error!("[SETTINGS] Failed to save settings: {e}");
        }
    }

    /// React to settings that changed since the previous tick
    async fn sync_settings(&mut self, settings: &AnalyzerSettings) {
        if self.ctx.analysis_enabled && !settings.enabled {
            tracing::info!("[LOOP] Analysis disabled, clearing annotations");
            self.clear_presenter().await;
        }
        self.ctx.analysis_enabled = settings.enabled;

        if self.ctx.applied_elo == Some(settings.elo) {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            match engine.set_strength(settings.elo).await {
                Ok(()) => self.ctx.applied_elo = Some(settings.elo),
                Err(e) => tracing::warn!("[ENGINE] Could not apply ELO {}: {e}", settings.elo),
            }
        }
    }

    async fn clear_presenter(&mut self) {
        if let Err(e) = self.presenter.clear().await {
            tracing::warn!("[LOOP] Failed to clear annotations: {e}");
        }
    }

    async fn perform(&mut self, action: RecoveryAction, now: Instant) {
        match action {
            RecoveryAction::None => {}
            RecoveryAction::ResetBaseline => {
                tracing::info!("[RECOVERY] Source structure changed, resetting baseline");
                self.ctx.tracker.reset_baseline();
            }
            RecoveryAction::Refresh(_) => {
                tracing::warn!("[RECOVERY] Repeated faults, refreshing source");
                match self.snapshots.refresh().await {
                    Ok(()) => self.ctx.recovery.recovery_succeeded(action, now),
                    Err(e) => {
                        tracing::error!("[RECOVERY] Refresh failed: {e}");
                        if self.ctx.recovery.recovery_failed(action) == RecoveryAction::Reload {
                            self.reload(now).await;
                        }
                    }
                }
            }
            RecoveryAction::Reload => self.reload(now).await,
        }
    }

    async fn reload(&mut self, now: Instant) {
        tracing::error!("[RECOVERY] Critical fault threshold reached, reloading source");
        if let Err(e) = self.snapshots.reload().await {
            tracing::error!("[RECOVERY] Reload failed: {e}");
            return;
        }
        self.ctx.recovery.recovery_succeeded(RecoveryAction::Reload, now);
        self.ctx.tracker.reset_baseline();

        if self.engine.is_none() {
            self.relaunch_engine().await;
        }
    }

    async fn relaunch_engine(&mut self) {
        let Some(launcher) = self.launcher.clone() else {
            return;
        };
        let elo = self.config.snapshot().elo;
        match launcher.launch(elo).await {
            Ok(engine) => {
                tracing::info!("[ENGINE] Engine restarted");
                self.engine = Some(engine);
                self.ctx.applied_elo = Some(elo);
            }
            Err(e) => tracing::warn!("[ENGINE] Engine still unavailable: {e}"),
        }
    }

    /// Clear annotations, then stop the engine
    pub async fn shutdown(mut self) {
        tracing::info!("[LOOP] Stopping");
        self.clear_presenter().await;
        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.shutdown(self.options.engine_grace).await {
                tracing::warn!("[ENGINE] Shutdown error: {e}");
            }
        }
        tracing::info!("[LOOP] Engine and annotations cleaned up");
    }
}
