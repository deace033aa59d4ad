//! FEN synthesis
//!
//! Only piece placement and active colour are derived from the snapshot.
//! Castling rights, en-passant square and move counters are not observable
//! from a piece map and are written as the fixed placeholder ` KQkq - 0 1`.

use super::error::{BoardResult, BoardStateError};
use super::piece::{Color, PieceCode};
use super::snapshot::BoardSnapshot;

/// Trailing FEN fields that cannot be read from a snapshot
pub const FEN_PLACEHOLDER_SUFFIX: &str = "KQkq - 0 1";

pub struct FenSynthesizer;

impl FenSynthesizer {
    /// Build a FEN string for `snapshot` with `turn` to move
    ///
    /// Fails with [`BoardStateError::InvalidKingCount`] unless there is exactly
    /// one king of each colour.
    pub fn synthesize(snapshot: &BoardSnapshot, turn: Color) -> BoardResult<String> {
        validate_kings(snapshot)?;

        let mut grid: [[Option<PieceCode>; 8]; 8] = [[None; 8]; 8];
        for (square, piece) in snapshot.iter() {
            grid[usize::from(square.rank() - 1)][usize::from(square.file() - 1)] = Some(piece);
        }

        let placement = grid
            .iter()
            .rev()
            .map(encode_rank)
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!("{placement} {} {FEN_PLACEHOLDER_SUFFIX}", turn.fen_char()))
    }
}

/// Exactly one king per colour
pub fn validate_kings(snapshot: &BoardSnapshot) -> BoardResult<()> {
    let white = snapshot.king_count(Color::White);
    let black = snapshot.king_count(Color::Black);
    if white == 1 && black == 1 {
        Ok(())
    } else {
        Err(BoardStateError::InvalidKingCount { white, black })
    }
}

fn encode_rank(rank: &[Option<PieceCode>; 8]) -> String {
    let mut out = String::with_capacity(8);
    let mut empty = 0u8;
    for cell in rank {
        match cell {
            Some(piece) => {
                if empty > 0 {
                    out.push(char::from(b'0' + empty));
                    empty = 0;
                }
                out.push(piece.fen_char());
            }
            None => empty += 1,
        }
    }
    if empty > 0 {
        out.push(char::from(b'0' + empty));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::square::Square;

    fn starting_snapshot() -> BoardSnapshot {
        const BACK_RANK: [char; 8] = ['r', 'n', 'b', 'q', 'k', 'b', 'n', 'r'];
        let mut snapshot = BoardSnapshot::new();
        for (file, kind) in (1u8..=8).zip(BACK_RANK) {
            let entries = [
                (1, Color::White, kind),
                (2, Color::White, 'p'),
                (7, Color::Black, 'p'),
                (8, Color::Black, kind),
            ];
            for (rank, color, kind) in entries {
                let code = format!("{}{kind}", color.fen_char());
                if let (Some(square), Ok(piece)) = (Square::new(file, rank), PieceCode::parse(&code)) {
                    snapshot.insert(square, piece);
                }
            }
        }
        snapshot
    }

    #[test]
    fn test_king_pawn_position() {
        let snapshot = BoardSnapshot::from_raw([("e1", "wk"), ("e8", "bk"), ("e4", "wp")]);
        let fen = FenSynthesizer::synthesize(&snapshot, Color::White).unwrap();
        assert_eq!(fen, "4k3/8/8/8/4P3/8/8/4K3 w KQkq - 0 1");
    }

    #[test]
    fn test_starting_position() {
        let fen = FenSynthesizer::synthesize(&starting_snapshot(), Color::White).unwrap();
        assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn test_black_to_move() {
        let snapshot = BoardSnapshot::from_raw([("a1", "wk"), ("h8", "bk")]);
        let fen = FenSynthesizer::synthesize(&snapshot, Color::Black).unwrap();
        assert_eq!(fen, "7k/8/8/8/8/8/8/K7 b KQkq - 0 1");
    }

    #[test]
    fn test_king_count_is_validated() {
        //! Missing, duplicated and absent kings are all rejected
        let missing_black = BoardSnapshot::from_raw([("e1", "wk")]);
        assert_eq!(
            FenSynthesizer::synthesize(&missing_black, Color::White),
            Err(BoardStateError::InvalidKingCount { white: 1, black: 0 })
        );

        let two_white = BoardSnapshot::from_raw([("e1", "wk"), ("d1", "wk"), ("e8", "bk")]);
        assert_eq!(
            FenSynthesizer::synthesize(&two_white, Color::White),
            Err(BoardStateError::InvalidKingCount { white: 2, black: 1 })
        );

        assert_eq!(
            FenSynthesizer::synthesize(&BoardSnapshot::new(), Color::White),
            Err(BoardStateError::InvalidKingCount { white: 0, black: 0 })
        );
    }
}
