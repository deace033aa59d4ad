//! Move selection policy applied to ranked engine output

pub mod selector;

pub use selector::{MoveSelector, RngDraws, SelectionDraws, SelectionKind, BLUNDER_BAND, SUBOPTIMAL_BAND};
