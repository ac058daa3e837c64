//! Move-selecting agents: the shared `Agent` trait, a uniform random
//! baseline, and the tabular Q-learning agent with its value table.

mod agent;
mod q_learning;
mod random;
mod value_table;

pub use agent::Agent;
pub use q_learning::{AgentConfig, QLearningAgent};
pub use random::RandomAgent;
pub use value_table::{TableEntry, ValueTable};
