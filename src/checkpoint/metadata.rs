use serde::{Deserialize, Serialize};

use crate::ai::{AgentConfig, TableEntry};
use crate::game::Side;

/// Current on-disk table format.
pub const TABLE_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    TABLE_FORMAT_VERSION
}

/// Metadata stored alongside a value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub agent: String,
    pub side: Side,
    /// Self-play episodes accumulated over every run that saved this table.
    #[serde(default)]
    pub episodes_trained: usize,
    pub timestamp: u64,
    pub entries: usize,
    pub hyperparameters: AgentConfig,
}

/// Full contents of one table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFile {
    pub metadata: TableMetadata,
    pub entries: Vec<TableEntry>,
}
