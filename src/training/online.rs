//! Learning while a human plays against the agent.

use crate::ai::QLearningAgent;
use crate::game::{GameEngine, Move, MoveError};
use crate::training::rewards::reward_for;

/// Let the agent choose and play its move, then credit it with the
/// position that follows. Returns `None` when the agent has no move.
pub fn agent_move(
    agent: &mut QLearningAgent,
    engine: &mut GameEngine,
    learn: bool,
) -> Result<Option<Move>, MoveError> {
    let Some(mv) = agent.choose_move(engine) else {
        return Ok(None);
    };
    let (state, outcome) = engine.apply_move(mv)?;
    if learn {
        let reward = reward_for(outcome, agent.side());
        agent.update(reward, &state, outcome.is_terminal(), engine);
    }
    Ok(Some(mv))
}

/// Give the agent its terminal reward when the opponent's move ended the
/// game. No-op while the game is still running.
pub fn learn_from_game_end(agent: &mut QLearningAgent, engine: &GameEngine) {
    if !engine.is_terminal() {
        return;
    }
    let reward = reward_for(engine.outcome(), agent.side());
    agent.update(reward, &engine.state(), true, engine);
    agent.reset_episode();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AgentConfig, ValueTable};
    use crate::game::{Outcome, Side};

    fn black_agent(table: ValueTable) -> QLearningAgent {
        let config = AgentConfig {
            epsilon: 0.0,
            ..AgentConfig::default()
        };
        QLearningAgent::with_seed(Side::Black, config, table, 13)
    }

    #[test]
    fn test_agent_move_learns_from_winning_move() {
        // Black to move; (1,1) -> (0,1) reaches the back rank.
        let mut engine = GameEngine::from_position("w.w/.b./...".parse().unwrap(), Side::Black);
        let winning = Move::from_coords(1, 1, 0, 1).unwrap();
        let start = engine.state();
        let mut table = ValueTable::new();
        table.set(start, winning, 0.5);
        let mut agent = black_agent(table);

        let played = agent_move(&mut agent, &mut engine, true).unwrap();
        assert_eq!(played, Some(winning));
        assert_eq!(engine.outcome(), Outcome::BlackWins);
        assert!((agent.table().get(&start, &winning) - (0.5 + 0.1 * (1.0 - 0.5))).abs() < 1e-12);
    }

    #[test]
    fn test_agent_move_without_learning_leaves_table() {
        let mut engine = GameEngine::new();
        engine.apply_move(Move::from_coords(0, 0, 1, 0).unwrap()).unwrap();
        let mut agent = black_agent(ValueTable::new());

        assert!(agent_move(&mut agent, &mut engine, false).unwrap().is_some());
        assert!(agent.table().is_empty());
        assert_eq!(engine.turn(), Side::White);
    }

    #[test]
    fn test_loss_after_opponent_move_is_learned() {
        // Black's only move lets White through on (1,2) -> (2,2).
        let mut engine = GameEngine::from_position(".../..w/b..".parse().unwrap(), Side::Black);
        let mut agent = black_agent(ValueTable::new());

        let mv = agent_move(&mut agent, &mut engine, true).unwrap().unwrap();
        assert_eq!(mv, Move::from_coords(2, 0, 1, 0).unwrap());
        let (state, _) = *agent.last_choice().unwrap();
        assert_eq!(engine.outcome(), Outcome::InProgress);
        assert_eq!(agent.table().get(&state, &mv), 0.0);

        engine.apply_move(Move::from_coords(1, 2, 2, 2).unwrap()).unwrap();
        assert_eq!(engine.outcome(), Outcome::WhiteWins);

        learn_from_game_end(&mut agent, &engine);
        assert_eq!(agent.table().get(&state, &mv), 0.1 * -500.0);
        assert!(agent.last_choice().is_none());
    }

    #[test]
    fn test_learn_from_game_end_ignores_running_game() {
        let engine = GameEngine::new();
        let mut agent = black_agent(ValueTable::new());
        learn_from_game_end(&mut agent, &engine);
        assert!(agent.table().is_empty());
    }
}
