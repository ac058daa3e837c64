use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::{Position, BOARD_SIZE};

/// A single pawn step, either a forward slide or a diagonal capture.
///
/// Serializes as `[[r1, c1], [r2, c2]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(Position, Position)", into = "(Position, Position)")]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }

    /// Build a move from raw coordinates, `None` if any is off the board.
    pub fn from_coords(r1: usize, c1: usize, r2: usize, c2: usize) -> Option<Move> {
        Some(Move {
            from: Position::new(r1, c1)?,
            to: Position::new(r2, c2)?,
        })
    }

    pub fn is_diagonal(&self) -> bool {
        self.from.col != self.to.col
    }
}

impl From<(Position, Position)> for Move {
    fn from((from, to): (Position, Position)) -> Self {
        Move { from, to }
    }
}

impl From<Move> for (Position, Position) {
    fn from(mv: Move) -> Self {
        (mv.from, mv.to)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoveError {
    #[error("expected four numbers 'r1 c1 r2 c2', found {0}")]
    WrongArity(usize),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("coordinates must be in 0..{BOARD_SIZE}")]
    OutOfRange,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Parse console input such as `0 0 1 0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(ParseMoveError::WrongArity(parts.len()));
        }
        let mut coords = [0usize; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| ParseMoveError::NotANumber(part.to_string()))?;
        }
        let [r1, c1, r2, c2] = coords;
        Move::from_coords(r1, c1, r2, c2).ok_or(ParseMoveError::OutOfRange)
    }
}
