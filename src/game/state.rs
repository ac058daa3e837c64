use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Board, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    WhiteWins,
    BlackWins,
    Draw,
}

impl Outcome {
    pub fn win_for(side: Side) -> Outcome {
        match side {
            Side::White => Outcome::WhiteWins,
            Side::Black => Outcome::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::WhiteWins => Some(Side::White),
            Outcome::BlackWins => Some(Side::Black),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::InProgress => f.write_str("in progress"),
            Outcome::WhiteWins => f.write_str("White wins"),
            Outcome::BlackWins => f.write_str("Black wins"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// Board contents plus side to move. This is the positional half of a
/// value-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Side,
}

impl GameState {
    pub fn new(board: Board, turn: Side) -> Self {
        GameState { board, turn }
    }

    pub fn initial() -> Self {
        GameState {
            board: Board::new(),
            turn: Side::White,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.board, self.turn.to_cell().symbol())
    }
}

/// Plain read-out of an engine for rendering or session persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub turn: Side,
    pub outcome: Outcome,
}
