//! boardwatch: move inference and engine-assisted suggestions from board snapshots
//!
//! - [`board`] - squares, pieces, snapshots, move inference and FEN
//! - [`selection`] - picking a move from ranked engine lines
//! - [`core`] - settings, the shared config channel and the settings watcher
//! - [`pipeline`] - the fault-tolerant polling loop and its collaborator traits
//! - [`io`] - file source, console presenter and status line

pub mod board;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod selection;
