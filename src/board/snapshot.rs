//! Board snapshots
//!
//! A snapshot is whatever the visual source could read at one instant: a map
//! from square to piece. It may be empty or partial and is never assumed to be
//! a complete, legal position.
//!
//! Raw input is tolerated entry by entry. Unreadable squares or piece codes are
//! dropped with a debug log instead of failing the whole snapshot.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::piece::{Color, PieceCode};
use super::square::Square;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "BTreeMap<String, String>")]
pub struct BoardSnapshot {
    pieces: HashMap<Square, PieceCode>,
}

impl BoardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(square, piece)` text pairs, skipping unreadable entries
    pub fn from_raw<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut snapshot = Self::new();
        for (square, piece) in entries {
            let (square, piece) = (square.as_ref(), piece.as_ref());
            match (Square::parse(square), PieceCode::parse(piece)) {
                (Ok(sq), Ok(pc)) => {
                    snapshot.insert(sq, pc);
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::debug!("[SNAPSHOT] Skipping {square:?} -> {piece:?}: {e}");
                }
            }
        }
        snapshot
    }

    /// Place a piece, returning whatever occupied the square before
    pub fn insert(&mut self, square: Square, piece: PieceCode) -> Option<PieceCode> {
        self.pieces.insert(square, piece)
    }

    pub fn remove(&mut self, square: Square) -> Option<PieceCode> {
        self.pieces.remove(&square)
    }

    pub fn get(&self, square: Square) -> Option<PieceCode> {
        self.pieces.get(&square).copied()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Square, PieceCode)> + '_ {
        self.pieces.iter().map(|(sq, pc)| (*sq, *pc))
    }

    /// Number of kings of `color`
    pub fn king_count(&self, color: Color) -> usize {
        self.pieces
            .values()
            .filter(|p| p.is_king() && p.color == color)
            .count()
    }
}

impl FromIterator<(Square, PieceCode)> for BoardSnapshot {
    fn from_iter<T: IntoIterator<Item = (Square, PieceCode)>>(iter: T) -> Self {
        Self {
            pieces: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, String>> for BoardSnapshot {
    fn from(raw: HashMap<String, String>) -> Self {
        Self::from_raw(raw)
    }
}

impl From<BoardSnapshot> for BTreeMap<String, String> {
    fn from(snapshot: BoardSnapshot) -> Self {
        snapshot
            .pieces
            .into_iter()
            .map(|(sq, pc)| (sq.to_algebraic(), pc.code()))
            .collect()
    }
}
