//! Piece codes
//!
//! Sources identify pieces with a two-letter code: colour (`w`/`b`) followed
//! by kind (`p`, `n`, `b`, `r`, `q`, `k`). FEN uses one letter, uppercase for
//! White.

use std::fmt;
use std::str::FromStr;

use uci_engine::Side;

use super::error::{BoardResult, BoardStateError};

/// Piece colour, doubling as the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Active-colour letter used in FEN
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Lowercase letter for this kind
    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// Colour and kind of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceCode {
    pub color: Color,
    pub kind: PieceKind,
}

impl PieceCode {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Parse a two-letter code such as `wp` or `bk`
    pub fn parse(text: &str) -> BoardResult<Self> {
        let invalid = || BoardStateError::InvalidPieceCode {
            input: text.to_owned(),
        };
        let mut chars = text.trim().chars();
        let color = match chars.next().map(|c| c.to_ascii_lowercase()) {
            Some('w') => Color::White,
            Some('b') => Color::Black,
            _ => return Err(invalid()),
        };
        let kind = chars.next().and_then(PieceKind::from_char).ok_or_else(invalid)?;
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { color, kind })
    }

    /// Two-letter source code
    pub fn code(self) -> String {
        format!("{}{}", self.color.fen_char(), self.kind.to_char())
    }

    /// FEN piece letter
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.to_char().to_ascii_uppercase(),
            Color::Black => self.kind.to_char(),
        }
    }

    pub fn is_king(self) -> bool {
        self.kind == PieceKind::King
    }
}

impl FromStr for PieceCode {
    type Err = BoardStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PieceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:?}", self.color, self.kind)
    }
}
