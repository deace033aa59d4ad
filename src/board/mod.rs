//! Board reconstruction
//!
//! Turns raw `{square -> piece}` reads into inferred moves and FEN strings.

pub mod error;
pub mod fen;
pub mod piece;
pub mod snapshot;
pub mod square;
pub mod tracker;

pub use error::{BoardResult, BoardStateError};
pub use fen::{FenSynthesizer, FEN_PLACEHOLDER_SUFFIX};
pub use piece::{Color, PieceCode, PieceKind};
pub use snapshot::BoardSnapshot;
pub use square::Square;
pub use tracker::{BoardStateTracker, MoveCandidate, TrackerUpdate, UpdateStatus};
