use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ai::{AgentConfig, QLearningAgent, RandomAgent, ValueTable};
use crate::checkpoint::{AgentId, TableStore};
use crate::error::{TableError, TrainingError};
use crate::game::{Outcome, Side};
use crate::training::episode::{evaluate, play_self_play_episode, stream_seed, EvalReport};
use crate::training::metrics::TrainingMetrics;

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub progress_interval: usize,
    /// Games against a random opponent after training; 0 skips evaluation.
    pub eval_games: usize,
    /// Seed for reproducible runs. `None` seeds from the OS. Limited to
    /// `0..=i64::MAX`, the range of a TOML integer.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 5000,
            progress_interval: 500,
            eval_games: 100,
            seed: None,
        }
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingProgress {
    pub completed: usize,
    pub total: usize,
    pub white_win_rate: f32,
    pub black_win_rate: f32,
    pub draw_rate: f32,
    pub average_game_length: f32,
    pub white_entries: usize,
    pub black_entries: usize,
}

/// Tally of one `self_play` run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelfPlayStats {
    pub episodes_completed: usize,
    pub cancelled: bool,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
}

/// What a persisted training run did.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes_completed: usize,
    pub cancelled: bool,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub white_entries: usize,
    pub black_entries: usize,
    pub white_eval: Option<EvalReport>,
    pub black_eval: Option<EvalReport>,
}

/// Self-play trainer for a pair of Q-learning agents.
pub struct Trainer {
    config: TrainerConfig,
    agent_config: AgentConfig,
    store: TableStore,
    cancel: Arc<AtomicBool>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, agent_config: AgentConfig, store: TableStore) -> Self {
        Trainer {
            config,
            agent_config,
            store,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Flag that stops training before the next episode when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Build the agent for `side`, seeded per stream when the run is seeded.
    pub fn make_agent(&self, side: Side, table: ValueTable) -> QLearningAgent {
        let config = self.agent_config.clone();
        match self.config.seed {
            Some(seed) => QLearningAgent::with_seed(side, config, table, stream_seed(seed, stream(side))),
            None => QLearningAgent::new(side, config, table),
        }
    }

    fn make_opponent(&self, side: Side) -> RandomAgent {
        match self.config.seed {
            Some(seed) => RandomAgent::with_seed(side, stream_seed(seed, 2 + stream(side))),
            None => RandomAgent::new(side),
        }
    }

    /// Run `episodes` self-play games in memory. `progress` is called every
    /// `progress_interval` completed episodes.
    pub fn self_play(
        &self,
        white: &mut QLearningAgent,
        black: &mut QLearningAgent,
        episodes: usize,
        mut progress: impl FnMut(TrainingProgress),
    ) -> Result<SelfPlayStats, TrainingError> {
        let window = self.config.progress_interval.max(1);
        let mut metrics = TrainingMetrics::with_capacity(window);
        let mut stats = SelfPlayStats::default();

        for episode in 1..=episodes {
            if self.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let result = play_self_play_episode(white, black)?;
            match result.outcome {
                Outcome::WhiteWins => stats.white_wins += 1,
                Outcome::BlackWins => stats.black_wins += 1,
                Outcome::Draw => stats.draws += 1,
                Outcome::InProgress => {}
            }
            stats.episodes_completed += 1;
            metrics.record_episode(result);

            if episode % window == 0 {
                progress(TrainingProgress {
                    completed: episode,
                    total: episodes,
                    white_win_rate: metrics.win_rate(Side::White, window),
                    black_win_rate: metrics.win_rate(Side::Black, window),
                    draw_rate: metrics.draw_rate(window),
                    average_game_length: metrics.average_game_length(window),
                    white_entries: white.table().len(),
                    black_entries: black.table().len(),
                });
            }
        }

        Ok(stats)
    }

    /// Load both tables, train for `episodes`, then save both tables.
    ///
    /// A cancelled run still saves what it learned.
    pub fn train_self_play(
        &self,
        episodes: usize,
        progress: impl FnMut(TrainingProgress),
    ) -> Result<TrainingSummary, TrainingError> {
        let [white_id, black_id] = AgentId::self_play_pair();
        let white_loaded = self.store.load_or_empty(&white_id);
        let black_loaded = self.store.load_or_empty(&black_id);
        let white_before = white_loaded.episodes_trained();
        let black_before = black_loaded.episodes_trained();

        let mut white = self.make_agent(Side::White, white_loaded.table);
        let mut black = self.make_agent(Side::Black, black_loaded.table);

        let stats = self.self_play(&mut white, &mut black, episodes, progress)?;

        let done = stats.episodes_completed;
        self.store
            .save(&white_id, white.table(), &self.agent_config, white_before + done)?;
        self.store
            .save(&black_id, black.table(), &self.agent_config, black_before + done)?;

        let (white_eval, black_eval) = if self.config.eval_games > 0 && !stats.cancelled {
            let mut white_opponent = self.make_opponent(Side::Black);
            let mut black_opponent = self.make_opponent(Side::White);
            (
                Some(evaluate(&mut white, &mut white_opponent, self.config.eval_games)?),
                Some(evaluate(&mut black, &mut black_opponent, self.config.eval_games)?),
            )
        } else {
            (None, None)
        };

        Ok(TrainingSummary {
            episodes_completed: done,
            cancelled: stats.cancelled,
            white_wins: stats.white_wins,
            black_wins: stats.black_wins,
            draws: stats.draws,
            white_entries: white.table().len(),
            black_entries: black.table().len(),
            white_eval,
            black_eval,
        })
    }

    /// Headless training run with console progress, using
    /// `num_episodes` from the configuration.
    pub fn train(&self) -> Result<TrainingSummary, TrainingError> {
        let episodes = self.config.num_episodes;
        println!(
            "Starting self-play training for {} episodes (tables in {})...",
            episodes,
            self.store.dir().display()
        );
        println!("-------------------------------------------");

        let summary = self.train_self_play(episodes, |p| {
            println!(
                "Episode {}/{} | white: {:.1}% | black: {:.1}% | draw: {:.1}% | avg_len: {:.1} | entries: {}/{}",
                p.completed,
                p.total,
                p.white_win_rate * 100.0,
                p.black_win_rate * 100.0,
                p.draw_rate * 100.0,
                p.average_game_length,
                p.white_entries,
                p.black_entries,
            );
        })?;

        println!("-------------------------------------------");
        if summary.cancelled {
            println!(
                "Training cancelled after {} episodes.",
                summary.episodes_completed
            );
        } else {
            println!(
                "Training complete. Total episodes: {}",
                summary.episodes_completed
            );
        }
        println!(
            "Results: white {} | black {} | draw {}",
            summary.white_wins, summary.black_wins, summary.draws
        );
        for (side, report) in [(Side::White, summary.white_eval), (Side::Black, summary.black_eval)] {
            if let Some(report) = report {
                println!(
                    "Eval {} vs Random ({} games): {:.1}% win rate ({} lost, {} drawn)",
                    side,
                    report.games,
                    report.win_rate() * 100.0,
                    report.losses,
                    report.draws
                );
            }
        }

        Ok(summary)
    }

    /// Delete both self-play tables.
    pub fn reset_learning(&self) -> Result<usize, TableError> {
        self.store.reset_learning(&AgentId::self_play_pair())
    }
}

fn stream(side: Side) -> usize {
    match side {
        Side::White => 0,
        Side::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::TableStoreConfig;
    use crate::game::GameEngine;
    use std::path::Path;

    fn trainer_in(dir: &Path, seed: u64) -> Trainer {
        let config = TrainerConfig {
            num_episodes: 200,
            progress_interval: 50,
            eval_games: 0,
            seed: Some(seed),
        };
        let store = TableStore::new(TableStoreConfig {
            table_dir: dir.to_path_buf(),
        });
        Trainer::new(config, AgentConfig::default(), store)
    }

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.num_episodes, 5000);
        assert_eq!(config.progress_interval, 500);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_progress_called_every_interval() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 1);
        let mut seen = Vec::new();
        let summary = trainer.train_self_play(200, |p| seen.push(p.completed)).unwrap();

        assert_eq!(seen, vec![50, 100, 150, 200]);
        assert_eq!(summary.episodes_completed, 200);
        assert_eq!(summary.white_wins + summary.black_wins + summary.draws, 200);
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_progress_rates_cover_long_intervals() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer_in(dir.path(), 4);
        trainer.config.progress_interval = 600;
        let mut white = trainer.make_agent(Side::White, ValueTable::new());
        let mut black = trainer.make_agent(Side::Black, ValueTable::new());
        let mut reports = Vec::new();
        let stats = trainer
            .self_play(&mut white, &mut black, 600, |p| reports.push(p))
            .unwrap();

        assert_eq!(reports.len(), 1);
        let report = reports[0];
        let expected_white = stats.white_wins as f32 / 600.0;
        let expected_black = stats.black_wins as f32 / 600.0;
        assert!((report.white_win_rate - expected_white).abs() < 1e-6);
        assert!((report.black_win_rate - expected_black).abs() < 1e-6);
    }

    #[test]
    fn test_training_persists_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 2);
        let summary = trainer.train_self_play(100, |_| {}).unwrap();

        let [white_id, black_id] = AgentId::self_play_pair();
        let white = trainer.store().load_or_empty(&white_id);
        let black = trainer.store().load_or_empty(&black_id);
        assert_eq!(white.table.len(), summary.white_entries);
        assert_eq!(black.table.len(), summary.black_entries);
        assert_eq!(white.episodes_trained(), 100);
        assert_eq!(black.episodes_trained(), 100);
    }

    #[test]
    fn test_repeated_runs_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 3);
        let first = trainer.train_self_play(100, |_| {}).unwrap();
        let second = trainer.train_self_play(100, |_| {}).unwrap();

        assert!(second.black_entries >= first.black_entries);
        assert!(second.white_entries >= first.white_entries);
        let black = trainer.store().load_or_empty(&AgentId::new(Side::Black));
        assert_eq!(black.episodes_trained(), 200);
    }

    #[test]
    fn test_cancelled_run_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 4);
        let flag = trainer.cancel_flag();
        let summary = trainer
            .train_self_play(200, |p| {
                if p.completed == 100 {
                    flag.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.episodes_completed, 100);
        let white = trainer.store().load_or_empty(&AgentId::new(Side::White));
        assert_eq!(white.episodes_trained(), 100);
        assert!(!white.table.is_empty());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let first = trainer_in(a.path(), 9).train_self_play(150, |_| {}).unwrap();
        let second = trainer_in(b.path(), 9).train_self_play(150, |_| {}).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluation_reported_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer_in(dir.path(), 5);
        trainer.config.eval_games = 10;
        let summary = trainer.train_self_play(50, |_| {}).unwrap();
        assert_eq!(summary.white_eval.map(|r| r.games), Some(10));
        assert_eq!(summary.black_eval.map(|r| r.games), Some(10));
    }

    #[test]
    fn test_reset_learning_forgets_tables() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 6);
        trainer.train_self_play(20, |_| {}).unwrap();
        assert_eq!(trainer.reset_learning().unwrap(), 2);
        assert!(trainer
            .store()
            .load_or_empty(&AgentId::new(Side::Black))
            .table
            .is_empty());
    }

    #[test]
    fn test_training_convergence_smoke() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 2024);
        trainer.train_self_play(5000, |_| {}).unwrap();

        let black = trainer.store().load_or_empty(&AgentId::new(Side::Black)).table;
        assert!(black.iter().any(|(_, &v)| v != 0.0));

        // Every key is a position with Black to move and one of its legal moves.
        for ((state, mv), value) in black.iter() {
            assert_eq!(state.turn, Side::Black);
            let engine = GameEngine::from_position(state.board, state.turn);
            assert!(engine.legal_moves(Side::Black).contains(mv), "bad key {state} {mv}");
            assert!(value.is_finite());
        }

        // Some reply to a White opening has been valued.
        let opening = GameEngine::new();
        let replies_valued = opening.current_moves().into_iter().any(|white_open| {
            let mut engine = opening.clone();
            engine.apply_move(white_open).is_ok()
                && engine
                    .current_moves()
                    .iter()
                    .any(|reply| black.get(&engine.state(), reply) != 0.0)
        });
        assert!(replies_valued);
    }
}
