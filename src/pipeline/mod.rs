//! The fault-tolerant polling pipeline
//!
//! - [`FaultRecoveryLoop`] - drives cycles and escalates repeated faults
//! - [`RecoveryState`] - fault counters and recovery decisions
//! - [`PipelineContext`] - state carried between cycles
//! - [`sources`] - collaborator traits the loop is built from

pub mod commands;
pub mod context;
pub mod cycle;
pub mod recovery;
pub mod runner;
pub mod sources;

pub use commands::{command_channel, Command, CommandReceiver, CommandSender};
pub use context::PipelineContext;
pub use cycle::CycleReport;
pub use recovery::{FaultKind, RecoveryAction, RecoveryState, TransientKind};
pub use runner::{FaultRecoveryLoop, LoopOptions};
pub use sources::{
    AnalyzerLauncher, BestMoveEvent, EngineLauncher, MoveLogProvider, PositionAnalyzer, Presenter, SnapshotProvider,
    SourceError, SourceResult,
};
