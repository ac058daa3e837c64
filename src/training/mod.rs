//! Training infrastructure: the self-play trainer, episode and evaluation
//! helpers, terminal rewards, rolling metrics and online learning for
//! interactive games.

pub mod episode;
pub mod metrics;
pub mod online;
pub mod rewards;
pub mod trainer;

pub use episode::{evaluate, play_eval_game, play_self_play_episode, EvalReport};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use rewards::reward_for;
pub use trainer::{SelfPlayStats, Trainer, TrainerConfig, TrainingProgress, TrainingSummary};
