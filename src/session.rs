//! Independent games keyed by a caller-chosen session id.
//!
//! Each session owns its `GameEngine`; sessions never share state. Games
//! live until they are removed or the store is dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::game::{GameEngine, GameSnapshot, Move};

/// Body of a move request: `{"session_id": "...", "move": [[r1, c1], [r2, c2]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub session_id: String,
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    games: HashMap<String, GameEngine>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh game under `id`, replacing any game already there.
    pub fn new_game(&mut self, id: impl Into<String>) -> GameSnapshot {
        let engine = GameEngine::new();
        let snapshot = engine.snapshot();
        self.games.insert(id.into(), engine);
        snapshot
    }

    fn engine(&self, id: &str) -> Result<&GameEngine, SessionError> {
        self.games
            .get(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    pub fn state(&self, id: &str) -> Result<GameSnapshot, SessionError> {
        self.engine(id).map(GameEngine::snapshot)
    }

    pub fn legal_moves(&self, id: &str) -> Result<Vec<Move>, SessionError> {
        self.engine(id).map(GameEngine::current_moves)
    }

    /// Play `mv` in the session's game. A rejected move leaves the game
    /// unchanged.
    pub fn apply_move(&mut self, id: &str, mv: Move) -> Result<GameSnapshot, SessionError> {
        let engine = self
            .games
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))?;
        engine.apply_move(mv)?;
        Ok(engine.snapshot())
    }

    pub fn handle_move(&mut self, request: &MoveRequest) -> Result<GameSnapshot, SessionError> {
        self.apply_move(&request.session_id, request.mv)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.games.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Serialize one game for storage between requests.
    pub fn export_json(&self, id: &str) -> Result<String, SessionError> {
        let snapshot = self.state(id)?;
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Restore a game previously written by `export_json`.
    pub fn import_json(&mut self, id: impl Into<String>, json: &str) -> Result<GameSnapshot, SessionError> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        self.games
            .insert(id.into(), GameEngine::from_snapshot(snapshot));
        Ok(snapshot)
    }
}
