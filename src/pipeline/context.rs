//! Per-run pipeline state

use std::time::Instant;

use super::recovery::RecoveryState;
use crate::board::BoardStateTracker;

/// State carried from one cycle to the next, owned by the loop
#[derive(Debug)]
pub struct PipelineContext {
    pub tracker: BoardStateTracker,
    pub recovery: RecoveryState,
    /// Evaluation of the last analysed position, acting side's perspective
    pub last_evaluation: Option<f32>,
    /// New moves were seen and no analysis has completed for them yet
    pub analysis_pending: bool,
    /// Rating last sent to the engine
    pub applied_elo: Option<i32>,
    /// Whether analysis was enabled on the previous cycle
    pub analysis_enabled: bool,
}

impl PipelineContext {
    pub fn new(now: Instant) -> Self {
        Self {
            tracker: BoardStateTracker::new(),
            recovery: RecoveryState::new(now),
            last_evaluation: None,
            analysis_pending: false,
            applied_elo: None,
            analysis_enabled: true,
        }
    }
}
