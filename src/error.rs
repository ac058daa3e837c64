use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that can occur while reading or writing persisted value tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("value table {path} is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("value table {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("value table {path} has format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("failed to write value table {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode value table: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("agent selected an illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("persistence error: {0}")]
    Persistence(#[from] TableError),
}

/// Errors returned by the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no such game: {0}")]
    UnknownSession(String),

    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("invalid session snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
