//! Error types for board reconstruction
//!
//! Every variant is a per-cycle condition: the pipeline logs it and moves on.

use thiserror::Error;

/// Errors produced while parsing or validating board snapshots
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardStateError {
    /// A snapshot used for analysis must hold exactly one king per colour
    #[error("Invalid king count: white={white}, black={black}")]
    InvalidKingCount { white: usize, black: usize },

    /// Square text in neither `e2` nor `52` form, or off the board
    #[error("Invalid square: {input:?}")]
    InvalidSquare { input: String },

    /// Piece text that is not a colour letter followed by a kind letter
    #[error("Invalid piece code: {input:?}")]
    InvalidPieceCode { input: String },
}

/// Result type alias for board operations
pub type BoardResult<T> = Result<T, BoardStateError>;
