//! Installation record store.
//!
//! Each deployment target keeps a `.installed.json` file recording what
//! agentry installed there: one record per agent id with the mode used,
//! the content hash (copy mode), the link target (symlink mode), and a
//! timestamp. Health checks and repair read this store to distinguish
//! agentry-managed files from foreign ones.
//!
//! The store is rewritten atomically on every save so a crash mid-write
//! never leaves a truncated record file behind.

use crate::deploy::DeployMode;
use crate::error::{AgentryError, Result};
use crate::fs::atomic_write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Filename of the record store inside a deployment target root.
pub const RECORDS_FILE: &str = ".installed.json";

/// One installed agent as recorded at install time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Agent id this record belongs to.
    pub agent_id: String,

    /// Mode the agent was installed with.
    pub mode: DeployMode,

    /// blake3 hash of the installed content. Present in copy mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,

    /// Hub path the symlink points at. Present in symlink mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<PathBuf>,

    /// When the record was written.
    pub installed_at: DateTime<Utc>,
}

/// The per-target record store, keyed by agent id.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordStore {
    #[serde(default)]
    records: BTreeMap<String, InstallationRecord>,
}

impl RecordStore {
    /// Load the record store from a target root. A missing file is an
    /// empty store, not an error.
    pub fn load(target_root: &Path) -> Result<Self> {
        let path = target_root.join(RECORDS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to read record store '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AgentryError::Deployment(format!(
                "record store '{}' is corrupt: {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the store atomically into a target root.
    pub fn save(&self, target_root: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AgentryError::Deployment(format!("failed to serialize record store: {}", e))
        })?;

        atomic_write(target_root.join(RECORDS_FILE), json.as_bytes())
    }

    /// Insert or replace the record for an agent.
    pub fn upsert(&mut self, record: InstallationRecord) {
        self.records.insert(record.agent_id.clone(), record);
    }

    /// Remove the record for an agent. Returns the removed record, if any.
    pub fn remove(&mut self, agent_id: &str) -> Option<InstallationRecord> {
        self.records.remove(agent_id)
    }

    /// Look up the record for an agent.
    pub fn get(&self, agent_id: &str) -> Option<&InstallationRecord> {
        self.records.get(agent_id)
    }

    /// All records in agent id order.
    pub fn iter(&self) -> impl Iterator<Item = &InstallationRecord> {
        self.records.values()
    }

    /// Number of recorded agents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, mode: DeployMode) -> InstallationRecord {
        InstallationRecord {
            agent_id: id.to_string(),
            mode,
            source_hash: match mode {
                DeployMode::Copy => Some("abc123".to_string()),
                DeployMode::Symlink => None,
            },
            link_target: match mode {
                DeployMode::Symlink => Some(PathBuf::from("/hub/agents/core/a.md")),
                DeployMode::Copy => None,
            },
            installed_at: Utc::now(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::load(dir.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();

        let mut store = RecordStore::default();
        store.upsert(record("config-reader", DeployMode::Symlink));
        store.upsert(record("security-auditor", DeployMode::Copy));
        store.save(dir.path()).unwrap();

        let loaded = RecordStore::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);

        let sym = loaded.get("config-reader").unwrap();
        assert_eq!(sym.mode, DeployMode::Symlink);
        assert!(sym.link_target.is_some());
        assert!(sym.source_hash.is_none());

        let copy = loaded.get("security-auditor").unwrap();
        assert_eq!(copy.mode, DeployMode::Copy);
        assert_eq!(copy.source_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn upsert_replaces_existing_record() {
        let mut store = RecordStore::default();
        store.upsert(record("a", DeployMode::Symlink));
        store.upsert(record("a", DeployMode::Copy));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().mode, DeployMode::Copy);
    }

    #[test]
    fn remove_returns_record() {
        let mut store = RecordStore::default();
        store.upsert(record("a", DeployMode::Symlink));

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RECORDS_FILE), "{not json").unwrap();

        let err = RecordStore::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn iter_is_id_ordered() {
        let mut store = RecordStore::default();
        store.upsert(record("zeta", DeployMode::Copy));
        store.upsert(record("alpha", DeployMode::Copy));

        let ids: Vec<&str> = store.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, ["alpha", "zeta"]);
    }
}
