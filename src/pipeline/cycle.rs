//! One pipeline cycle
//!
//! snapshot -> tracker -> (pending analysis on our turn) -> FEN -> engine ->
//! selection -> presenter and status line.
//!
//! Source failures are returned as [`SourceError`] for the loop to classify.
//! Everything else (empty reads, bad king counts, engine errors) is a normal
//! outcome reported through [`CycleReport`].

use uci_engine::{EngineError, Side};

use super::runner::FaultRecoveryLoop;
use super::sources::{BestMoveEvent, SourceError, SourceResult};
use crate::board::{BoardStateError, FenSynthesizer, Square, UpdateStatus};
use crate::core::AnalyzerSettings;
use crate::selection::{MoveSelector, SelectionDraws};

/// What a cycle that did not fault ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    /// Nothing could be read
    SnapshotEmpty,
    /// First read after start or a baseline reset
    Baseline,
    /// No new moves to analyse
    Idle,
    AnalysisDisabled,
    /// New moves seen but it is not the configured side's turn
    OpponentToMove,
    NoEngine,
    /// The position cannot be analysed
    InvalidPosition(BoardStateError),
    /// The engine query failed; it is retried next cycle
    EngineFailed(String),
    /// The engine found no move (mate or stalemate)
    NoMoveFound,
    Analyzed(BestMoveEvent),
}

impl<D: SelectionDraws> FaultRecoveryLoop<D> {
    pub(super) async fn run_cycle(&mut self, settings: &AnalyzerSettings) -> SourceResult<CycleReport> {
        let snapshot = self.snapshots.snapshot().await?;
        let move_log_len = match self.move_log.move_log().await {
            Ok(log) => Some(log.len()),
            Err(e) => {
                tracing::warn!("[LOOP] Error getting moves list: {e}");
                None
            }
        };

        let update = self.ctx.tracker.update(snapshot, move_log_len);
        match update.status {
            UpdateStatus::SnapshotEmpty => return Ok(CycleReport::SnapshotEmpty),
            UpdateStatus::Baseline => return Ok(CycleReport::Baseline),
            UpdateStatus::Compared => {}
        }
        if !update.moves.is_empty() {
            tracing::debug!("[LOOP] Detected {} moved piece(s)", update.moves.len());
            self.ctx.analysis_pending = true;
        }
        if !self.ctx.analysis_pending {
            return Ok(CycleReport::Idle);
        }

        if !settings.enabled {
            self.ctx.analysis_pending = false;
            return Ok(CycleReport::AnalysisDisabled);
        }
        let turn = self.ctx.tracker.turn();
        if settings.side != turn {
            tracing::debug!("[LOOP] Waiting for opponent ({turn} to move)");
            self.ctx.analysis_pending = false;
            return Ok(CycleReport::OpponentToMove);
        }

        self.analyse(settings).await
    }

    async fn analyse(&mut self, settings: &AnalyzerSettings) -> SourceResult<CycleReport> {
        let turn = self.ctx.tracker.turn();
        let Some(engine) = self.engine.as_mut() else {
            self.ctx.analysis_pending = false;
            return Ok(CycleReport::NoEngine);
        };

        let fen = match self.ctx.tracker.previous().map(|s| FenSynthesizer::synthesize(s, turn)) {
            Some(Ok(fen)) => fen,
            Some(Err(e)) => {
                tracing::warn!("[LOOP] Could not generate valid FEN, skipping analysis: {e}");
                self.ctx.analysis_pending = false;
                return Ok(CycleReport::InvalidPosition(e));
            }
            None => return Ok(CycleReport::Idle),
        };

        tracing::info!("[LOOP] Our turn, analysing {fen}");
        let lines = match engine.analyse(&fen, self.options.think_time, self.options.candidates).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("[ENGINE] Analysis failed: {e}");
                if matches!(e, EngineError::Disconnected | EngineError::Unavailable { .. }) {
                    tracing::error!("[ENGINE] Engine lost, continuing without analysis");
                    self.engine = None;
                }
                return Ok(CycleReport::EngineFailed(e.to_string()));
            }
        };
        self.ctx.analysis_pending = false;

        let side = Side::from(turn);
        let Some((chosen, kind)) = MoveSelector::select(&lines, side, &settings.legit, &mut self.draws) else {
            tracing::warn!("[LOOP] No moves found in analysis");
            return Ok(CycleReport::NoMoveFound);
        };
        let evaluation = lines[0].evaluation.for_side(side);

        let (from, to) = match (Square::parse(chosen.mv.from_square()), Square::parse(chosen.mv.to_square())) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                return Err(SourceError::Other(anyhow::anyhow!("engine move {}: {e}", chosen.mv)));
            }
        };
        let event = BestMoveEvent {
            from,
            to,
            mv: chosen.mv.clone(),
            evaluation,
            kind,
        };

        self.presenter.show_best_move(&event, &settings.arrow_color).await?;
        if let Some(status) = self.status.as_mut() {
            if let Err(e) = status.emit(evaluation) {
                tracing::warn!("[LOOP] Failed to write evaluation: {e}");
            }
        }
        self.ctx.last_evaluation = Some(evaluation);
        tracing::info!("[LOOP] Best move: {} Eval: {evaluation:+.2}", event.mv);
        Ok(CycleReport::Analyzed(event))
    }
}
