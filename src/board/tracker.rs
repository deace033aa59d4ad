//! Board state tracking and move inference
//!
//! The tracker owns the previous snapshot and the side to move. Each call to
//! [`BoardStateTracker::update`] compares the new snapshot with the previous one
//! and infers which pieces moved.
//!
//! # Diff
//!
//! ```text
//! appeared    = { sq: piece in new  | new[sq]  != prev.get(sq) }
//! disappeared = { sq: piece in prev | prev[sq] != new.get(sq)  }
//! ```
//!
//! Every disappeared piece is paired with an appeared square holding the same
//! piece code, and each appeared square is used at most once. Disappeared
//! pieces with no partner (captures, promotions) produce no candidate.
//!
//! # Tie-break
//!
//! Disappeared squares are visited in rank-major order. Each one takes the
//! unclaimed matching square at the smallest Chebyshev distance; equal
//! distances go to the lower square in rank-major order. The result depends
//! only on the two snapshots, never on map iteration order.
//!
//! # Turn
//!
//! The move-log length is the authoritative turn signal: even means White to
//! move. Candidate colours are only used to cross-check it.

use super::piece::{Color, PieceCode};
use super::snapshot::BoardSnapshot;
use super::square::Square;

/// A piece observed leaving one square and arriving on another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCandidate {
    pub from: Square,
    pub to: Square,
    pub piece: PieceCode,
}

/// What happened to the snapshot handed to [`BoardStateTracker::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Nothing was read; tracker state is unchanged
    SnapshotEmpty,
    /// No previous snapshot to compare with; this one became the baseline
    Baseline,
    /// Compared against the previous snapshot
    Compared,
}

/// Result of one tracker update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerUpdate {
    pub moves: Vec<MoveCandidate>,
    pub turn_changed: bool,
    pub status: UpdateStatus,
}

/// Owns the previous snapshot and the side to move
#[derive(Debug, Default)]
pub struct BoardStateTracker {
    previous: Option<BoardSnapshot>,
    turn: Color,
}

impl BoardStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Side to move from the number of moves in the move log
    pub fn detect_turn(move_log_len: usize) -> Color {
        if move_log_len % 2 == 1 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn previous(&self) -> Option<&BoardSnapshot> {
        self.previous.as_ref()
    }

    /// Forget the previous snapshot; the next non-empty read becomes a baseline
    pub fn reset_baseline(&mut self) {
        if self.previous.take().is_some() {
            tracing::debug!("[TRACKER] Baseline cleared");
        }
    }

    /// Apply the move-log signal (if any), then diff `snapshot` against the previous one
    pub fn update(&mut self, snapshot: BoardSnapshot, move_log_len: Option<usize>) -> TrackerUpdate {
        let turn_changed = match move_log_len {
            Some(len) => self.apply_move_log(len),
            None => false,
        };

        if snapshot.is_empty() {
            tracing::debug!("[TRACKER] Empty snapshot, waiting");
            return TrackerUpdate {
                moves: Vec::new(),
                turn_changed,
                status: UpdateStatus::SnapshotEmpty,
            };
        }

        let Some(previous) = self.previous.take() else {
            tracing::debug!("[TRACKER] Baseline snapshot recorded");
            self.previous = Some(snapshot);
            return TrackerUpdate {
                moves: Vec::new(),
                turn_changed,
                status: UpdateStatus::Baseline,
            };
        };

        let moves = find_moved_pieces(&previous, &snapshot);
        self.previous = Some(snapshot);
        for mv in &moves {
            tracing::info!("[TRACKER] {} moved: {} -> {}", mv.piece.color, mv.from, mv.to);
        }
        if move_log_len.is_some() {
            self.cross_check_turn(&moves);
        }

        TrackerUpdate {
            moves,
            turn_changed,
            status: UpdateStatus::Compared,
        }
    }

    fn apply_move_log(&mut self, len: usize) -> bool {
        let turn = Self::detect_turn(len);
        if turn == self.turn {
            return false;
        }
        tracing::info!("[TRACKER] Turn changed: {} -> {}", self.turn, turn);
        self.turn = turn;
        true
    }

    /// Compare the move-log turn with the side implied by the moved pieces
    fn cross_check_turn(&self, moves: &[MoveCandidate]) {
        let Some(first) = moves.first() else {
            return;
        };
        if moves.iter().any(|m| m.piece.color != first.piece.color) {
            return;
        }
        let inferred = first.piece.color.opposite();
        if inferred != self.turn {
            tracing::warn!(
                "[TRACKER] Move log says {} to move but {} just moved; trusting the move log",
                self.turn,
                first.piece.color
            );
        }
    }
}

/// Infer moves between two snapshots
pub fn find_moved_pieces(old: &BoardSnapshot, new: &BoardSnapshot) -> Vec<MoveCandidate> {
    let mut appeared: Vec<(Square, PieceCode)> = new
        .iter()
        .filter(|(sq, piece)| old.get(*sq) != Some(*piece))
        .collect();
    let mut disappeared: Vec<(Square, PieceCode)> = old
        .iter()
        .filter(|(sq, piece)| new.get(*sq) != Some(*piece))
        .collect();
    appeared.sort_unstable_by_key(|(sq, _)| *sq);
    disappeared.sort_unstable_by_key(|(sq, _)| *sq);

    let mut moves = Vec::new();
    for (from, piece) in disappeared {
        let nearest = appeared
            .iter()
            .enumerate()
            .filter(|(_, (_, candidate))| *candidate == piece)
            .min_by_key(|(_, (to, _))| (from.chebyshev_distance(*to), *to))
            .map(|(index, _)| index);

        if let Some(index) = nearest {
            let (to, _) = appeared.remove(index);
            moves.push(MoveCandidate { from, to, piece });
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> BoardSnapshot {
        BoardSnapshot::from_raw(entries.iter().copied())
    }

    fn sq(text: &str) -> Square {
        Square::parse(text).unwrap()
    }

    #[test]
    fn test_detect_turn_parity() {
        assert_eq!(BoardStateTracker::detect_turn(0), Color::White);
        assert_eq!(BoardStateTracker::detect_turn(1), Color::Black);
        assert_eq!(BoardStateTracker::detect_turn(2), Color::White);
        assert_eq!(BoardStateTracker::detect_turn(37), Color::Black);
    }

    #[test]
    fn test_first_snapshot_becomes_baseline() {
        let mut tracker = BoardStateTracker::new();
        let update = tracker.update(snapshot(&[("e1", "wk")]), None);
        assert_eq!(update.status, UpdateStatus::Baseline);
        assert!(update.moves.is_empty());
        assert!(tracker.previous().is_some());
    }

    #[test]
    fn test_empty_snapshot_leaves_state_untouched() {
        //! A failed read must not wipe the baseline
        let mut tracker = BoardStateTracker::new();
        let baseline = snapshot(&[("e1", "wk"), ("e8", "bk")]);
        tracker.update(baseline.clone(), None);

        let update = tracker.update(BoardSnapshot::new(), None);
        assert_eq!(update.status, UpdateStatus::SnapshotEmpty);
        assert!(update.moves.is_empty());
        assert_eq!(tracker.previous(), Some(&baseline));
    }

    #[test]
    fn test_single_move_diff() {
        let mut tracker = BoardStateTracker::new();
        tracker.update(snapshot(&[("g1", "wn"), ("e1", "wk"), ("e8", "bk")]), None);
        let update = tracker.update(snapshot(&[("f3", "wn"), ("e1", "wk"), ("e8", "bk")]), None);

        assert_eq!(update.status, UpdateStatus::Compared);
        assert_eq!(
            update.moves,
            vec![MoveCandidate {
                from: sq("g1"),
                to: sq("f3"),
                piece: PieceCode::parse("wn").unwrap(),
            }]
        );
    }

    #[test]
    fn test_identical_snapshots_yield_no_moves() {
        let mut tracker = BoardStateTracker::new();
        let position = snapshot(&[("e2", "wp"), ("e1", "wk"), ("e8", "bk")]);
        tracker.update(position.clone(), None);
        let update = tracker.update(position, None);
        assert!(update.moves.is_empty());
    }

    #[test]
    fn test_capture_reports_only_the_capturing_piece() {
        //! The captured piece vanishes without a partner and is not reported
        let old = snapshot(&[("e4", "wp"), ("d5", "bp"), ("e1", "wk"), ("e8", "bk")]);
        let new = snapshot(&[("d5", "wp"), ("e1", "wk"), ("e8", "bk")]);
        let moves = find_moved_pieces(&old, &new);
        assert_eq!(moves.len(), 1);
        assert_eq!((moves[0].from, moves[0].to), (sq("e4"), sq("d5")));
    }

    #[test]
    fn test_castling_yields_two_candidates() {
        let old = snapshot(&[("e1", "wk"), ("h1", "wr"), ("e8", "bk")]);
        let new = snapshot(&[("g1", "wk"), ("f1", "wr"), ("e8", "bk")]);
        let mut moves = find_moved_pieces(&old, &new);
        moves.sort_by_key(|m| m.from);
        assert_eq!(moves.len(), 2);
        assert_eq!((moves[0].from, moves[0].to), (sq("e1"), sq("g1")));
        assert_eq!((moves[1].from, moves[1].to), (sq("h1"), sq("f1")));
    }

    #[test]
    fn test_promotion_is_consumed_silently() {
        let old = snapshot(&[("a7", "wp"), ("e1", "wk"), ("e8", "bk")]);
        let new = snapshot(&[("a8", "wq"), ("e1", "wk"), ("e8", "bk")]);
        assert!(find_moved_pieces(&old, &new).is_empty());
    }

    #[test]
    fn test_ambiguous_match_prefers_nearest_square() {
        //! Two rooks vanish and two rook squares appear; each rook is paired
        //! with the closer destination
        let old = snapshot(&[("a1", "wr"), ("h8", "wr")]);
        let new = snapshot(&[("h7", "wr"), ("a2", "wr")]);
        let mut moves = find_moved_pieces(&old, &new);
        moves.sort_by_key(|m| m.from);
        assert_eq!((moves[0].from, moves[0].to), (sq("a1"), sq("a2")));
        assert_eq!((moves[1].from, moves[1].to), (sq("h8"), sq("h7")));
    }

    #[test]
    fn test_equal_distance_tie_goes_to_lower_square() {
        let old = snapshot(&[("d4", "wq")]);
        let new = snapshot(&[("d6", "wq"), ("b4", "wq")]);
        let moves = find_moved_pieces(&old, &new);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, sq("b4"));
    }

    #[test]
    fn test_move_log_drives_turn_and_reports_changes() {
        let mut tracker = BoardStateTracker::new();
        let update = tracker.update(snapshot(&[("e1", "wk")]), Some(0));
        assert!(!update.turn_changed);
        assert_eq!(tracker.turn(), Color::White);

        let update = tracker.update(snapshot(&[("e1", "wk")]), Some(1));
        assert!(update.turn_changed);
        assert_eq!(tracker.turn(), Color::Black);
    }

    #[test]
    fn test_move_log_wins_over_inferred_parity() {
        //! White moved but the log still reports White to move; the log is kept
        let mut tracker = BoardStateTracker::new();
        tracker.update(snapshot(&[("e2", "wp"), ("e1", "wk"), ("e8", "bk")]), Some(0));
        let update = tracker.update(snapshot(&[("e4", "wp"), ("e1", "wk"), ("e8", "bk")]), Some(0));
        assert_eq!(update.moves.len(), 1);
        assert_eq!(tracker.turn(), Color::White);
    }

    #[test]
    fn test_empty_snapshot_still_applies_turn_signal() {
        let mut tracker = BoardStateTracker::new();
        let update = tracker.update(BoardSnapshot::new(), Some(3));
        assert_eq!(update.status, UpdateStatus::SnapshotEmpty);
        assert!(update.turn_changed);
        assert_eq!(tracker.turn(), Color::Black);
    }

    #[test]
    fn test_reset_baseline() {
        let mut tracker = BoardStateTracker::new();
        tracker.update(snapshot(&[("e1", "wk")]), None);
        tracker.reset_baseline();
        assert!(tracker.previous().is_none());
        let update = tracker.update(snapshot(&[("e2", "wk")]), None);
        assert_eq!(update.status, UpdateStatus::Baseline);
    }
}
