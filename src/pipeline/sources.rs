//! Collaborator interfaces
//!
//! The pipeline never reads a board or draws an arrow itself. It talks to:
//!
//! - [`SnapshotProvider`] - current piece placement, plus refresh/reload hooks
//! - [`MoveLogProvider`] - move list, used only for its length
//! - [`Presenter`] - shows the selected move and clears what it showed
//! - [`PositionAnalyzer`] - the analysis engine, with [`AnalyzerLauncher`] to
//!   start a new one after a hard recovery

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uci_engine::{EngineClient, EngineLocator, EngineResult, EngineSettings, RankedMove, UciMove};

use crate::board::{BoardSnapshot, Square};
use crate::core::ArrowColor;
use crate::selection::SelectionKind;

/// Failures reported by the snapshot and move-log sources
#[derive(Error, Debug)]
pub enum SourceError {
    /// A read that is expected to succeed on retry
    #[error("Inconsistent read: {0}")]
    Inconsistent(String),

    #[error("Source timed out: {0}")]
    Timeout(String),

    /// The structure the source reads from is missing
    #[error("Source structure missing: {0}")]
    StructureMissing(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for collaborator calls
pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait SnapshotProvider: Send {
    /// Current piece placement; may be empty or partial
    async fn snapshot(&mut self) -> SourceResult<BoardSnapshot>;

    /// Soft recovery: re-read the current view
    async fn refresh(&mut self) -> SourceResult<()>;

    /// Hard recovery: rebuild the source from scratch
    async fn reload(&mut self) -> SourceResult<()>;
}

#[async_trait]
pub trait MoveLogProvider: Send {
    async fn move_log(&mut self) -> SourceResult<Vec<String>>;
}

/// The move chosen for the acting side
#[derive(Debug, Clone, PartialEq)]
pub struct BestMoveEvent {
    pub from: Square,
    pub to: Square,
    pub mv: UciMove,
    /// Position evaluation in pawns from the acting side's perspective
    pub evaluation: f32,
    pub kind: SelectionKind,
}

#[async_trait]
pub trait Presenter: Send {
    async fn show_best_move(&mut self, event: &BestMoveEvent, color: &ArrowColor) -> anyhow::Result<()>;

    /// Remove everything this presenter has shown
    async fn clear(&mut self) -> anyhow::Result<()>;
}

/// Multi-candidate position analysis
#[async_trait]
pub trait PositionAnalyzer: Send {
    /// Up to `candidates` lines for `fen`, best first, White-relative
    async fn analyse(&mut self, fen: &str, think_time: Duration, candidates: usize) -> EngineResult<Vec<RankedMove>>;

    async fn set_strength(&mut self, elo: i32) -> EngineResult<()>;

    /// Stop the analyzer, waiting at most `grace`
    async fn shutdown(self: Box<Self>, grace: Duration) -> EngineResult<()>;
}

#[async_trait]
impl PositionAnalyzer for EngineClient {
    async fn analyse(&mut self, fen: &str, think_time: Duration, candidates: usize) -> EngineResult<Vec<RankedMove>> {
        EngineClient::analyse(self, fen, think_time, candidates).await
    }

    async fn set_strength(&mut self, elo: i32) -> EngineResult<()> {
        EngineClient::set_strength(self, elo).await.map(|_| ())
    }

    async fn shutdown(self: Box<Self>, grace: Duration) -> EngineResult<()> {
        EngineClient::shutdown(*self, grace).await
    }
}

/// Starts analyzers on demand
#[async_trait]
pub trait AnalyzerLauncher: Send + Sync {
    async fn launch(&self, elo: i32) -> EngineResult<Box<dyn PositionAnalyzer>>;
}

/// Launches a UCI engine found through [`EngineLocator`]
#[derive(Debug, Clone, Default)]
pub struct EngineLauncher {
    pub path_hint: Option<PathBuf>,
    pub locator: EngineLocator,
    pub settings: EngineSettings,
}

#[async_trait]
impl AnalyzerLauncher for EngineLauncher {
    async fn launch(&self, elo: i32) -> EngineResult<Box<dyn PositionAnalyzer>> {
        let client = EngineClient::initialize_with(
            &self.locator,
            self.path_hint.as_deref(),
            Some(elo),
            self.settings,
        )
        .await?;
        Ok(Box::new(client))
    }
}
