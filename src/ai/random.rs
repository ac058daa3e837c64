use crate::game::{GameEngine, Move, Side};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Agent;

/// An agent that selects uniformly at random from legal moves.
pub struct RandomAgent {
    side: Side,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(side: Side) -> Self {
        RandomAgent {
            side,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(side: Side, seed: u64) -> Self {
        RandomAgent {
            side,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn select_move(&mut self, engine: &GameEngine) -> Option<Move> {
        let moves = engine.legal_moves(self.side);
        if moves.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..moves.len());
        Some(moves[idx])
    }

    fn side(&self) -> Side {
        self.side
    }

    fn name(&self) -> &str {
        "Random"
    }
}
