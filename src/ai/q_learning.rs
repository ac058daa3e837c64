use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::agent::Agent;
use crate::ai::value_table::ValueTable;
use crate::game::{GameEngine, GameState, Move, Side};

/// Q-learning hyperparameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Probability of playing a uniformly random move.
    pub epsilon: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.05,
        }
    }
}

/// Tabular Q-learning agent for one side.
///
/// Remembers only the last `(state, move)` it chose; `update` credits
/// that pair.
pub struct QLearningAgent {
    side: Side,
    config: AgentConfig,
    table: ValueTable,
    last: Option<(GameState, Move)>,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(side: Side, config: AgentConfig, table: ValueTable) -> Self {
        Self::with_rng(side, config, table, StdRng::from_os_rng())
    }

    pub fn with_seed(side: Side, config: AgentConfig, table: ValueTable, seed: u64) -> Self {
        Self::with_rng(side, config, table, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(side: Side, config: AgentConfig, table: ValueTable, rng: StdRng) -> Self {
        QLearningAgent {
            side,
            config,
            table,
            last: None,
            rng,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.config.epsilon = epsilon;
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn last_choice(&self) -> Option<&(GameState, Move)> {
        self.last.as_ref()
    }

    /// Forget the last choice. Called at the start of every episode.
    pub fn reset_episode(&mut self) {
        self.last = None;
    }

    /// Epsilon-greedy choice over the side's legal moves. Ties on the best
    /// value are broken uniformly at random.
    pub fn choose_move(&mut self, engine: &GameEngine) -> Option<Move> {
        let moves = engine.legal_moves(self.side);
        if moves.is_empty() {
            return None;
        }
        let state = engine.state();

        let mv = if self.rng.random::<f64>() < self.config.epsilon {
            moves[self.rng.random_range(0..moves.len())]
        } else {
            let (_, best) = self.table.best_moves(&state, &moves)?;
            best[self.rng.random_range(0..best.len())]
        };

        self.last = Some((state, mv));
        Some(mv)
    }

    /// Temporal-difference update of the last chosen pair.
    ///
    /// `Q <- Q + alpha * (reward + gamma * future - Q)` where `future` is 0
    /// on terminal steps and otherwise the best value over this side's
    /// moves from `resulting`, floored at 0.
    pub fn update(&mut self, reward: f64, resulting: &GameState, terminal: bool, engine: &GameEngine) {
        let Some((state, mv)) = self.last else {
            return;
        };
        let old = self.table.get(&state, &mv);
        let future = if terminal {
            0.0
        } else {
            self.table
                .future_estimate(resulting, &engine.legal_moves(self.side))
        };
        let new = old + self.config.alpha * (reward + self.config.gamma * future - old);
        self.table.set(state, mv, new);
    }
}

impl Agent for QLearningAgent {
    fn select_move(&mut self, engine: &GameEngine) -> Option<Move> {
        self.choose_move(engine)
    }

    fn side(&self) -> Side {
        self.side
    }

    fn name(&self) -> &str {
        "Q-learning"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn greedy() -> AgentConfig {
        AgentConfig {
            epsilon: 0.0,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.epsilon, 0.05);
    }

    #[test]
    fn test_choose_move_records_last_choice() {
        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), ValueTable::new(), 7);
        let engine = GameEngine::new();
        let mv = agent.choose_move(&engine).unwrap();
        assert!(engine.legal_moves(Side::White).contains(&mv));
        assert_eq!(agent.last_choice(), Some(&(engine.state(), mv)));

        agent.reset_episode();
        assert!(agent.last_choice().is_none());
    }

    #[test]
    fn test_choose_move_none_without_moves() {
        let mut agent = QLearningAgent::with_seed(Side::Black, greedy(), ValueTable::new(), 1);
        let engine = GameEngine::from_position("www/.../...".parse().unwrap(), Side::Black);
        assert!(agent.choose_move(&engine).is_none());
        assert!(agent.last_choice().is_none());
    }

    #[test]
    fn test_greedy_picks_highest_value() {
        let engine = GameEngine::new();
        let moves = engine.current_moves();
        let mut table = ValueTable::new();
        table.set(engine.state(), moves[1], 0.5);
        table.set(engine.state(), moves[2], -1.0);

        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), table, 3);
        for _ in 0..50 {
            assert_eq!(agent.choose_move(&engine), Some(moves[1]));
        }
    }

    #[test]
    fn test_ties_are_broken_randomly() {
        let engine = GameEngine::new();
        let moves = engine.current_moves();
        let mut table = ValueTable::new();
        table.set(engine.state(), moves[0], -1.0);

        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), table, 11);
        let picked: HashSet<Move> = (0..200).filter_map(|_| agent.choose_move(&engine)).collect();
        assert_eq!(picked, HashSet::from([moves[1], moves[2]]));
    }

    #[test]
    fn test_full_exploration_covers_all_moves() {
        let config = AgentConfig {
            epsilon: 1.0,
            ..AgentConfig::default()
        };
        let engine = GameEngine::new();
        let moves = engine.current_moves();
        let mut table = ValueTable::new();
        table.set(engine.state(), moves[0], 10.0);

        let mut agent = QLearningAgent::with_seed(Side::White, config, table, 5);
        let picked: HashSet<Move> = (0..200).filter_map(|_| agent.choose_move(&engine)).collect();
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_update_without_last_choice_is_noop() {
        let mut agent = QLearningAgent::with_seed(Side::Black, greedy(), ValueTable::new(), 1);
        let engine = GameEngine::new();
        agent.update(1.0, &engine.state(), true, &engine);
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_terminal_update_ignores_future() {
        let mut engine = GameEngine::new();
        let start = engine.state();
        let mv = engine.current_moves()[0];
        let (resulting, _) = engine.apply_move(mv).unwrap();

        let mut table = ValueTable::new();
        table.set(start, mv, 4.0);
        for m in engine.legal_moves(Side::White) {
            table.set(resulting, m, 100.0);
        }
        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), table, 2);
        agent.last = Some((start, mv));

        agent.update(-500.0, &resulting, true, &engine);
        assert_eq!(agent.table().get(&start, &mv), 4.0 + 0.1 * (-500.0 - 4.0));
    }

    #[test]
    fn test_nonterminal_update_bootstraps_from_own_moves() {
        let mut engine = GameEngine::new();
        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), ValueTable::new(), 9);
        let mv = agent.choose_move(&engine).unwrap();
        let start = engine.state();
        let (resulting, _) = engine.apply_move(mv).unwrap();

        let white_moves = engine.legal_moves(Side::White);
        agent.table.set(resulting, white_moves[0], 2.0);

        agent.update(0.0, &resulting, false, &engine);
        let expected = 0.0 + 0.1 * (0.0 + 0.9 * 2.0 - 0.0);
        assert!((agent.table().get(&start, &mv) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_nonterminal_update_floors_future_at_zero() {
        let mut engine = GameEngine::new();
        let mut agent = QLearningAgent::with_seed(Side::White, greedy(), ValueTable::new(), 4);
        let mv = agent.choose_move(&engine).unwrap();
        let start = engine.state();
        let (resulting, _) = engine.apply_move(mv).unwrap();
        for m in engine.legal_moves(Side::White) {
            agent.table.set(resulting, m, -10.0);
        }

        agent.update(0.5, &resulting, false, &engine);
        assert!((agent.table().get(&start, &mv) - 0.05).abs() < 1e-12);
    }
}
