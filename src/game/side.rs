use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Cell, BOARD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Side {
    /// Get the other side
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Side::White => Cell::White,
            Side::Black => Cell::Black,
        }
    }

    /// Row step of a forward move: White advances down the rows, Black up.
    pub fn forward(self) -> isize {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    /// The row this side must reach to win.
    pub fn goal_row(self) -> usize {
        match self {
            Side::White => BOARD_SIZE - 1,
            Side::Black => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
