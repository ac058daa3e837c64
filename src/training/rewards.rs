use crate::game::{Outcome, Side};

/// Reward for the winning side.
pub const WIN_REWARD: f64 = 1.0;
/// Reward for the losing side.
pub const LOSS_REWARD: f64 = -500.0;
/// Reward for both sides on a draw.
pub const DRAW_REWARD: f64 = 0.5;

/// Terminal reward for `side` given the outcome of a game.
pub fn reward_for(outcome: Outcome, side: Side) -> f64 {
    match outcome {
        Outcome::InProgress => 0.0,
        Outcome::Draw => DRAW_REWARD,
        Outcome::WhiteWins | Outcome::BlackWins => {
            if outcome.winner() == Some(side) {
                WIN_REWARD
            } else {
                LOSS_REWARD
            }
        }
    }
}
