use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Move};

/// One persisted `(state, move) -> value` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub state: GameState,
    #[serde(rename = "move")]
    pub mv: Move,
    pub value: f64,
}

/// Tabular action values. Missing keys read as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: HashMap<(GameState, Move), f64>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &GameState, mv: &Move) -> f64 {
        self.values.get(&(*state, *mv)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, state: GameState, mv: Move, value: f64) {
        self.values.insert((state, mv), value);
    }

    pub fn contains(&self, state: &GameState, mv: &Move) -> bool {
        self.values.contains_key(&(*state, *mv))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(GameState, Move), &f64)> {
        self.values.iter()
    }

    /// Highest value among `moves` in `state` and every move attaining it.
    /// `None` when `moves` is empty.
    pub fn best_moves(&self, state: &GameState, moves: &[Move]) -> Option<(f64, Vec<Move>)> {
        let values: Vec<f64> = moves.iter().map(|mv| self.get(state, mv)).collect();
        let best = values.iter().copied().reduce(f64::max)?;
        let ties = moves
            .iter()
            .zip(&values)
            .filter(|(_, v)| **v == best)
            .map(|(mv, _)| *mv)
            .collect();
        Some((best, ties))
    }

    /// Bootstrap term for a TD target: the best value among `moves`,
    /// never below 0.
    pub fn future_estimate(&self, state: &GameState, moves: &[Move]) -> f64 {
        moves
            .iter()
            .map(|mv| self.get(state, mv))
            .fold(0.0, f64::max)
    }

    /// Entries sorted by key, for stable files.
    pub fn to_entries(&self) -> Vec<TableEntry> {
        let mut entries: Vec<TableEntry> = self
            .values
            .iter()
            .map(|(&(state, mv), &value)| TableEntry { state, mv, value })
            .collect();
        entries.sort_by(|a, b| (a.state, a.mv).cmp(&(b.state, b.mv)));
        entries
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TableEntry>) -> Self {
        ValueTable {
            values: entries
                .into_iter()
                .map(|e| ((e.state, e.mv), e.value))
                .collect(),
        }
    }
}
