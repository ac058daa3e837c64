use crate::ai::{Agent, QLearningAgent, RandomAgent};
use crate::error::TrainingError;
use crate::game::{GameEngine, Outcome};
use crate::training::metrics::EpisodeResult;
use crate::training::rewards::reward_for;

/// Play one self-play episode between the two learning agents.
///
/// Both agents start with a cleared last-move memory and receive exactly
/// one terminal update once the game ends.
pub fn play_self_play_episode(
    white: &mut QLearningAgent,
    black: &mut QLearningAgent,
) -> Result<EpisodeResult, TrainingError> {
    white.reset_episode();
    black.reset_episode();

    let mut engine = GameEngine::new();
    let mut game_length = 0;

    let outcome = loop {
        let side = engine.turn();
        let mover = if side == white.side() {
            &mut *white
        } else {
            &mut *black
        };
        // A side without moves loses.
        let Some(mv) = mover.choose_move(&engine) else {
            break Outcome::win_for(side.opponent());
        };
        let (_, outcome) = engine.apply_move(mv)?;
        game_length += 1;
        if outcome.is_terminal() {
            break outcome;
        }
    };

    let final_state = engine.state();
    for agent in [white, black] {
        let reward = reward_for(outcome, agent.side());
        agent.update(reward, &final_state, true, &engine);
    }

    Ok(EpisodeResult {
        outcome,
        game_length,
    })
}

/// Play a single game between two agents on opposite sides, without
/// learning. Returns the outcome.
pub fn play_eval_game(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
) -> Result<Outcome, TrainingError> {
    let mut engine = GameEngine::new();

    loop {
        let side = engine.turn();
        let mover: &mut dyn Agent = if side == agent.side() {
            &mut *agent
        } else {
            &mut *opponent
        };
        let Some(mv) = mover.select_move(&engine) else {
            return Ok(Outcome::win_for(side.opponent()));
        };
        let (_, outcome) = engine.apply_move(mv)?;
        if outcome.is_terminal() {
            return Ok(outcome);
        }
    }
}

/// Tally of an evaluation run from the evaluated agent's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalReport {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl EvalReport {
    pub fn win_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f32 / self.games as f32
    }
}

/// Evaluate the agent greedily against a random opponent.
pub fn evaluate(
    agent: &mut QLearningAgent,
    opponent: &mut RandomAgent,
    eval_games: usize,
) -> Result<EvalReport, TrainingError> {
    let saved_epsilon = agent.epsilon();
    agent.set_epsilon(0.0);

    let mut report = EvalReport::default();
    let mut result = Ok(());
    for _ in 0..eval_games {
        agent.reset_episode();
        match play_eval_game(agent, opponent) {
            Ok(outcome) => {
                report.games += 1;
                match outcome.winner() {
                    Some(side) if side == agent.side() => report.wins += 1,
                    Some(_) => report.losses += 1,
                    None => report.draws += 1,
                }
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    agent.reset_episode();
    agent.set_epsilon(saved_epsilon);
    result.map(|()| report)
}

/// Derive a deterministic seed for one random stream of a seeded run.
pub fn stream_seed(base_seed: u64, stream: usize) -> u64 {
    // FNV-1a-inspired mixing for deterministic, well-distributed seeds
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = stream as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
