use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::{AgentConfig, ValueTable};
use crate::checkpoint::metadata::{TableFile, TableMetadata, TABLE_FORMAT_VERSION};
use crate::error::TableError;
use crate::game::Side;

/// Configuration for the table store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TableStoreConfig {
    pub table_dir: PathBuf,
}

impl Default for TableStoreConfig {
    fn default() -> Self {
        TableStoreConfig {
            table_dir: PathBuf::from("qtables"),
        }
    }
}

/// Identity of a persisted table: the side it plays plus an optional
/// qualifier for keeping several tables per side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentId {
    pub side: Side,
    pub qualifier: Option<String>,
}

impl AgentId {
    pub fn new(side: Side) -> Self {
        AgentId {
            side,
            qualifier: None,
        }
    }

    pub fn with_qualifier(side: Side, qualifier: impl Into<String>) -> Self {
        AgentId {
            side,
            qualifier: Some(qualifier.into()),
        }
    }

    /// The two self-play tables.
    pub fn self_play_pair() -> [AgentId; 2] {
        [AgentId::new(Side::White), AgentId::new(Side::Black)]
    }

    /// Stable name such as `black` or `black-tournament`.
    ///
    /// Distinct ids always give distinct names: qualifier bytes outside
    /// `[A-Za-z0-9-]` are written as `_XX` in hex, `_` included.
    pub fn name(&self) -> String {
        let side = match self.side {
            Side::White => "white",
            Side::Black => "black",
        };
        match &self.qualifier {
            None => side.to_string(),
            Some(q) => format!("{side}-{}", escape_qualifier(q)),
        }
    }

    fn file_name(&self) -> String {
        format!("qtable_{}.json", self.name())
    }
}

fn escape_qualifier(qualifier: &str) -> String {
    let mut out = String::with_capacity(qualifier.len());
    for byte in qualifier.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{byte:02X}"));
        }
    }
    out
}

/// A table read from the store, with its metadata when one was on disk.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub table: ValueTable,
    pub metadata: Option<TableMetadata>,
}

impl LoadedTable {
    pub fn episodes_trained(&self) -> usize {
        self.metadata.as_ref().map_or(0, |m| m.episodes_trained)
    }
}

/// Directory of JSON value tables, one file per agent.
///
/// Load-modify-save is not safe for concurrent writers; callers sharing a
/// directory across processes must serialize access themselves.
pub struct TableStore {
    config: TableStoreConfig,
}

impl TableStore {
    pub fn new(config: TableStoreConfig) -> Self {
        TableStore { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.table_dir
    }

    pub fn path_for(&self, id: &AgentId) -> PathBuf {
        self.config.table_dir.join(id.file_name())
    }

    /// Read a table file. `Ok(None)` if the agent has never been saved.
    ///
    /// Files written in another format version are rejected.
    pub fn load(&self, id: &AgentId) -> Result<Option<TableFile>, TableError> {
        let path = self.path_for(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TableError::Unavailable { path, source: e }),
        };
        let file: TableFile = serde_json::from_str(&json).map_err(|e| TableError::Corrupt {
            path: path.clone(),
            source: e,
        })?;
        if file.metadata.format_version != TABLE_FORMAT_VERSION {
            return Err(TableError::UnsupportedVersion {
                path,
                found: file.metadata.format_version,
                expected: TABLE_FORMAT_VERSION,
            });
        }
        Ok(Some(file))
    }

    /// Load a table, substituting an empty one when the file is missing,
    /// unreadable or corrupt.
    pub fn load_or_empty(&self, id: &AgentId) -> LoadedTable {
        match self.load(id) {
            Ok(Some(file)) => LoadedTable {
                table: ValueTable::from_entries(file.entries),
                metadata: Some(file.metadata),
            },
            Ok(None) => LoadedTable::default(),
            Err(e) => {
                eprintln!("Warning: {e}; starting '{}' with an empty table", id.name());
                LoadedTable::default()
            }
        }
    }

    /// Write the whole table, replacing any previous file atomically.
    pub fn save(
        &self,
        id: &AgentId,
        table: &ValueTable,
        hyperparameters: &AgentConfig,
        episodes_trained: usize,
    ) -> Result<PathBuf, TableError> {
        let path = self.path_for(id);
        let tmp_path = path.with_extension("json.tmp");

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let file = TableFile {
            metadata: TableMetadata {
                format_version: TABLE_FORMAT_VERSION,
                agent: id.name(),
                side: id.side,
                episodes_trained,
                timestamp,
                entries: table.len(),
                hyperparameters: hyperparameters.clone(),
            },
            entries: table.to_entries(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let failure = |source| TableError::WriteFailure {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.config.table_dir).map_err(failure)?;
        fs::write(&tmp_path, &json).map_err(failure)?;
        fs::rename(&tmp_path, &path).map_err(failure)?;

        Ok(path)
    }

    /// Delete one table. Returns whether a file was removed.
    pub fn delete(&self, id: &AgentId) -> Result<bool, TableError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TableError::WriteFailure { path, source: e }),
        }
    }

    /// Forget everything the named agents learned. Returns the number of
    /// tables removed.
    pub fn reset_learning(&self, ids: &[AgentId]) -> Result<usize, TableError> {
        let mut removed = 0;
        for id in ids {
            if self.delete(id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameEngine;

    fn store_in(dir: &Path) -> TableStore {
        TableStore::new(TableStoreConfig {
            table_dir: dir.join("tables"),
        })
    }

    fn sample_table() -> ValueTable {
        let engine = GameEngine::new();
        let mut table = ValueTable::new();
        for (i, mv) in engine.current_moves().into_iter().enumerate() {
            table.set(engine.state(), mv, i as f64 * 0.25 - 0.5);
        }
        table
    }

    #[test]
    fn test_agent_file_names() {
        assert_eq!(AgentId::new(Side::Black).file_name(), "qtable_black.json");
        assert_eq!(AgentId::new(Side::White).file_name(), "qtable_white.json");
        assert_eq!(
            AgentId::with_qualifier(Side::Black, "pve/v2").file_name(),
            "qtable_black-pve_2Fv2.json"
        );
        assert_eq!(
            AgentId::with_qualifier(Side::Black, "pve_v2").file_name(),
            "qtable_black-pve_5Fv2.json"
        );
    }

    #[test]
    fn test_similar_qualifiers_do_not_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let slashed = AgentId::with_qualifier(Side::Black, "pve/v2");
        let underscored = AgentId::with_qualifier(Side::Black, "pve_v2");
        assert_ne!(store.path_for(&slashed), store.path_for(&underscored));

        store.save(&slashed, &sample_table(), &AgentConfig::default(), 1).unwrap();
        assert!(store.load_or_empty(&underscored).table.is_empty());
        assert_eq!(store.load_or_empty(&slashed).table.len(), 3);
    }

    #[test]
    fn test_missing_table_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let id = AgentId::new(Side::Black);
        assert!(store.load(&id).unwrap().is_none());
        let loaded = store.load_or_empty(&id);
        assert!(loaded.table.is_empty());
        assert!(loaded.metadata.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let id = AgentId::new(Side::Black);
        let table = sample_table();

        let path = store.save(&id, &table, &AgentConfig::default(), 500).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = store.load_or_empty(&id);
        assert_eq!(loaded.table, table);
        let meta = loaded.metadata.unwrap();
        assert_eq!(meta.side, Side::Black);
        assert_eq!(meta.entries, 3);
        assert_eq!(meta.episodes_trained, 500);
        assert_eq!(meta.agent, "black");
    }

    #[test]
    fn test_save_overwrites_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let id = AgentId::new(Side::White);
        store.save(&id, &sample_table(), &AgentConfig::default(), 1).unwrap();
        store.save(&id, &ValueTable::new(), &AgentConfig::default(), 2).unwrap();

        let loaded = store.load_or_empty(&id);
        assert!(loaded.table.is_empty());
        assert_eq!(loaded.episodes_trained(), 2);
    }

    #[test]
    fn test_corrupt_table_recovers_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let id = AgentId::new(Side::Black);
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for(&id), "{ not json").unwrap();

        assert!(matches!(store.load(&id), Err(TableError::Corrupt { .. })));
        assert!(store.load_or_empty(&id).table.is_empty());
    }

    #[test]
    fn test_other_format_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let id = AgentId::new(Side::Black);
        let path = store.save(&id, &sample_table(), &AgentConfig::default(), 7).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let mut file: TableFile = serde_json::from_str(&json).unwrap();
        file.metadata.format_version = TABLE_FORMAT_VERSION + 1;
        fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

        assert!(matches!(
            store.load(&id),
            Err(TableError::UnsupportedVersion { found, .. }) if found == TABLE_FORMAT_VERSION + 1
        ));
        assert!(store.load_or_empty(&id).table.is_empty());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = dir.path().join("tables");
        fs::write(&blocker, "").unwrap();
        let store = store_in(dir.path());

        let err = store
            .save(&AgentId::new(Side::Black), &sample_table(), &AgentConfig::default(), 0)
            .unwrap_err();
        assert!(matches!(err, TableError::WriteFailure { .. }));
    }

    #[test]
    fn test_reset_learning_deletes_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let [white, black] = AgentId::self_play_pair();
        store.save(&white, &sample_table(), &AgentConfig::default(), 0).unwrap();
        store.save(&black, &sample_table(), &AgentConfig::default(), 0).unwrap();

        assert_eq!(store.reset_learning(&[white.clone(), black.clone()]).unwrap(), 2);
        assert!(store.load_or_empty(&white).table.is_empty());
        assert!(store.load_or_empty(&black).table.is_empty());
        assert_eq!(store.reset_learning(&[white, black]).unwrap(), 0);
    }

    #[test]
    fn test_qualified_tables_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let plain = AgentId::new(Side::Black);
        let tagged = AgentId::with_qualifier(Side::Black, "pve");
        store.save(&tagged, &sample_table(), &AgentConfig::default(), 0).unwrap();

        assert!(store.load_or_empty(&plain).table.is_empty());
        assert_eq!(store.load_or_empty(&tagged).table.len(), 3);
    }
}
