//! Hexapawn rules: a 3×3 board, three forward-moving pawns per side, and a
//! deterministic engine that generates moves, applies them and classifies
//! the outcome.

mod board;
mod engine;
mod moves;
mod side;
mod state;

pub use board::{Board, Cell, ParseBoardError, Position, BOARD_SIZE};
pub use engine::{GameEngine, MoveError};
pub use moves::{Move, ParseMoveError};
pub use side::Side;
pub use state::{GameSnapshot, GameState, Outcome};
