//! Board squares and their two textual encodings
//!
//! Snapshot sources report squares either algebraically (`e2`) or numerically
//! (`52`: file digit, then rank digit). Both decode into the same [`Square`],
//! and each encoding can be regenerated losslessly.
//!
//! ```text
//!   algebraic   numeric
//!      a1   <->   11
//!      e2   <->   52
//!      h8   <->   88
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::{BoardResult, BoardStateError};

/// A square on the 8×8 board, file and rank both 1-based
///
/// Ordering is rank-major (a1, b1, ..., h1, a2, ...), which is the order the
/// tracker uses to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Build a square from 1-based file and rank
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        ((1..=8).contains(&file) && (1..=8).contains(&rank)).then_some(Self { rank, file })
    }

    /// File, 1 (a) to 8 (h)
    pub fn file(self) -> u8 {
        self.file
    }

    /// Rank, 1 to 8
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Parse `e2`-style text (file letter is case-insensitive)
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        if !(b'a'..=b'h').contains(&file) || !bytes[1].is_ascii_digit() {
            return None;
        }
        Self::new(file - b'a' + 1, bytes[1] - b'0')
    }

    /// Parse `52`-style text
    pub fn from_numeric(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Self::new(bytes[0] - b'0', bytes[1] - b'0')
    }

    /// Parse either encoding
    pub fn parse(text: &str) -> BoardResult<Self> {
        let text = text.trim();
        let parsed = match text.as_bytes().first() {
            Some(b) if b.is_ascii_alphabetic() => Self::from_algebraic(text),
            _ => Self::from_numeric(text),
        };
        parsed.ok_or_else(|| BoardStateError::InvalidSquare {
            input: text.to_owned(),
        })
    }

    pub fn to_algebraic(self) -> String {
        format!("{}{}", (b'a' + self.file - 1) as char, self.rank)
    }

    pub fn to_numeric(self) -> String {
        format!("{}{}", self.file, self.rank)
    }

    /// King-move distance between two squares
    pub fn chebyshev_distance(self, other: Square) -> u8 {
        self.file.abs_diff(other.file).max(self.rank.abs_diff(other.rank))
    }
}

impl FromStr for Square {
    type Err = BoardStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

/// Convert `e2`-style text to `52`-style text
pub fn algebraic_to_numeric(text: &str) -> Option<String> {
    Square::from_algebraic(text).map(Square::to_numeric)
}

/// Convert `52`-style text to `e2`-style text
pub fn numeric_to_algebraic(text: &str) -> Option<String> {
    Square::from_numeric(text).map(Square::to_algebraic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_encodings_decode_to_same_square() {
        let a = Square::parse("e2").unwrap();
        let b = Square::parse("52").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.file(), 5);
        assert_eq!(a.rank(), 2);
    }

    #[test]
    fn test_encodings_round_trip_over_whole_board() {
        //! Every square survives algebraic -> numeric -> algebraic
        for file in 1..=8 {
            for rank in 1..=8 {
                let square = Square::new(file, rank).unwrap();
                let numeric = algebraic_to_numeric(&square.to_algebraic()).unwrap();
                assert_eq!(numeric, square.to_numeric());
                assert_eq!(numeric_to_algebraic(&numeric).unwrap(), square.to_algebraic());
            }
        }
    }

    #[test]
    fn test_rejects_off_board_and_malformed_text() {
        for bad in ["i1", "a9", "a0", "09", "90", "e", "e22", "", "ee", "5a"] {
            assert!(Square::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_uppercase_file_is_accepted() {
        assert_eq!(Square::parse("E4").unwrap().to_algebraic(), "e4");
    }

    #[test]
    fn test_rank_major_ordering() {
        let h1 = Square::parse("h1").unwrap();
        let a2 = Square::parse("a2").unwrap();
        assert!(h1 < a2);
    }

    #[test]
    fn test_chebyshev_distance() {
        let e2 = Square::parse("e2").unwrap();
        assert_eq!(e2.chebyshev_distance(Square::parse("e4").unwrap()), 2);
        assert_eq!(e2.chebyshev_distance(Square::parse("g3").unwrap()), 2);
        assert_eq!(e2.chebyshev_distance(e2), 0);
    }
}
