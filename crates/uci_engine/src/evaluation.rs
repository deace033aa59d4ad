//! Evaluation scale and ranked analysis results
//!
//! Engine scores arrive in centipawns or mate distances relative to the side to
//! move. They are stored here in pawns from White's perspective, with forced
//! mates saturating at [`MATE_SCORE`]. Callers re-express them for the side
//! they act for with [`Evaluation::for_side`].

use std::fmt;

use crate::protocol::Score;

/// Saturated value reported for a forced mate
pub const MATE_SCORE: f32 = 9.9;

/// Side to move in an analysed position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

/// Evaluation in pawns, White-relative
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Evaluation(f32);

impl Evaluation {
    pub fn from_white_pawns(pawns: f32) -> Self {
        Self(pawns)
    }

    /// Convert a side-to-move relative engine score to the White-relative scale
    ///
    /// `mate 0` means the side to move is already mated and counts as a loss.
    pub fn from_score(score: Score, side_to_move: Side) -> Self {
        let relative = match score {
            Score::Centipawns(cp) => cp as f32 / 100.0,
            Score::Mate(moves) if moves > 0 => MATE_SCORE,
            Score::Mate(_) => -MATE_SCORE,
        };
        match side_to_move {
            Side::White => Self(relative),
            Side::Black => Self(-relative),
        }
    }

    /// Pawns from White's perspective
    pub fn white_pawns(self) -> f32 {
        self.0
    }

    /// Pawns from `side`'s perspective
    pub fn for_side(self, side: Side) -> f32 {
        match side {
            Side::White => self.0,
            Side::Black => -self.0,
        }
    }

    /// Whole centipawns from `side`'s perspective; a saturated mate is ±990
    pub fn centipawns(self, side: Side) -> i32 {
        (self.for_side(side) * 100.0).round() as i32
    }

    pub fn is_mate(self) -> bool {
        self.0.abs() >= MATE_SCORE
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}", self.0)
    }
}

/// A move in long algebraic notation (`e2e4`, `e7e8q`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UciMove(String);

impl UciMove {
    /// Wrap a move token, rejecting anything shorter than two squares
    pub fn parse(token: &str) -> Option<Self> {
        let valid = (4..=5).contains(&token.len()) && token.is_ascii();
        valid.then(|| Self(token.to_owned()))
    }

    /// Origin square, algebraic
    pub fn from_square(&self) -> &str {
        &self.0[0..2]
    }

    /// Destination square, algebraic
    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a multi-candidate analysis
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMove {
    /// First move of the principal variation
    pub mv: UciMove,
    pub evaluation: Evaluation,
    /// Principal variation, `mv` first
    pub pv: Vec<UciMove>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawns_flip_for_black_to_move() {
        //! A +50cp score for Black to move is -0.50 for White
        let eval = Evaluation::from_score(Score::Centipawns(50), Side::Black);
        assert_eq!(eval.white_pawns(), -0.5);
        assert_eq!(eval.for_side(Side::Black), 0.5);
    }

    #[test]
    fn test_mate_scores_saturate() {
        assert_eq!(Evaluation::from_score(Score::Mate(3), Side::White).white_pawns(), MATE_SCORE);
        assert_eq!(Evaluation::from_score(Score::Mate(-2), Side::White).white_pawns(), -MATE_SCORE);
        assert_eq!(Evaluation::from_score(Score::Mate(0), Side::White).white_pawns(), -MATE_SCORE);
        assert_eq!(Evaluation::from_score(Score::Mate(1), Side::Black).white_pawns(), -MATE_SCORE);
        assert!(Evaluation::from_score(Score::Mate(1), Side::Black).is_mate());
    }

    #[test]
    fn test_centipawns_survive_pawn_scaling() {
        //! 70cp and 60cp differ by exactly 10 once back in centipawns
        let best = Evaluation::from_score(Score::Centipawns(70), Side::White);
        let other = Evaluation::from_score(Score::Centipawns(60), Side::White);
        assert_eq!(best.centipawns(Side::White) - other.centipawns(Side::White), 10);
        assert_eq!(best.centipawns(Side::Black), -70);
        assert_eq!(Evaluation::from_score(Score::Mate(2), Side::White).centipawns(Side::White), 990);
    }

    #[test]
    fn test_display_uses_explicit_sign() {
        assert_eq!(Evaluation::from_white_pawns(1.25).to_string(), "+1.25");
        assert_eq!(Evaluation::from_white_pawns(-9.9).to_string(), "-9.90");
    }

    #[test]
    fn test_uci_move_squares() {
        let mv = UciMove::parse("e7e8q").unwrap();
        assert_eq!(mv.from_square(), "e7");
        assert_eq!(mv.to_square(), "e8");
        assert_eq!(mv.promotion(), Some('q'));
        assert!(UciMove::parse("e2").is_none());
        assert!(UciMove::parse("0000").is_some());
    }
}
