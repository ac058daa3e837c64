use crate::game::{GameEngine, Move, Side};

/// Interface shared by everything that can pick a move.
pub trait Agent {
    /// Pick a move for `side()` in the engine's current position.
    /// `None` means the side has no legal move.
    fn select_move(&mut self, engine: &GameEngine) -> Option<Move>;

    /// The side this agent plays.
    fn side(&self) -> Side;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
