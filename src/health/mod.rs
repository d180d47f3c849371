//! Health checking and repair of deployed targets.
//!
//! The record store is the source of truth for expected state: `check`
//! classifies every tracked entry against it and additionally reports
//! foreign files found in the target root. `repair` reinstalls every
//! non-ok entry with its recorded mode; foreign files are reported but
//! never modified.
//!
//! Checks are lock-free reads. Repair mutates the record store and so runs
//! under the same advisory lock as install.

#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::deploy::{self, DeployMode, DeploymentTarget, EntryOutcome, EntryStatus, LOCK_FILE};
use crate::error::{AgentryError, Result};
use crate::events::{self, Event, EventAction};
use crate::fs::run_with_timeout_retries;
use crate::locks::{self, LockMetadata};
use crate::records::{InstallationRecord, RecordStore};
use crate::registry::AgentRegistry;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Classification of one tracked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    /// The entry matches its record exactly.
    Ok,
    /// A tracked symlink whose target no longer exists.
    BrokenLink,
    /// Content or link target no longer matches the record.
    Drifted,
    /// Tracked but absent from disk.
    Missing,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Ok => write!(f, "ok"),
            HealthStatus::BrokenLink => write!(f, "broken-link"),
            HealthStatus::Drifted => write!(f, "drifted"),
            HealthStatus::Missing => write!(f, "missing"),
        }
    }
}

/// One tracked entry's health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthEntry {
    pub agent_id: String,
    pub status: HealthStatus,
}

/// Result of a health check over one target.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    /// Tracked entries in record-store order.
    pub entries: Vec<HealthEntry>,

    /// Untracked files found in the target root. Reported only; repair
    /// never touches them.
    pub foreign: Vec<PathBuf>,
}

impl HealthReport {
    /// Whether every tracked entry is ok.
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(|e| e.status == HealthStatus::Ok)
    }

    /// Tracked entries that are not ok.
    pub fn non_ok(&self) -> Vec<&HealthEntry> {
        self.entries
            .iter()
            .filter(|e| e.status != HealthStatus::Ok)
            .collect()
    }
}

/// Result of a repair pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    /// Entries reinstalled this run.
    pub repaired: Vec<String>,

    /// Entries that could not be repaired.
    pub failed: Vec<EntryOutcome>,
}

impl RepairReport {
    /// Number of entries this run actually modified.
    pub fn modified_count(&self) -> usize {
        self.repaired.len()
    }

    /// Whether every non-ok entry was brought back to ok.
    pub fn all_repaired(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Check a deployment target against its record store.
pub fn check(target: &DeploymentTarget) -> Result<HealthReport> {
    let root = target.root()?;
    if !root.is_dir() {
        return Ok(HealthReport::default());
    }

    let store = RecordStore::load(&root)?;
    let mut report = HealthReport::default();

    for record in store.iter() {
        let dest = deploy::entry_path(&root, &record.agent_id);
        report.entries.push(HealthEntry {
            agent_id: record.agent_id.clone(),
            status: classify_entry(record, &dest)?,
        });
    }

    report.foreign = foreign_files(&root, &store)?;
    Ok(report)
}

/// Reinstall every non-ok tracked entry with its recorded mode.
///
/// Idempotent: with no external changes a second run modifies nothing.
pub fn repair(
    target: &DeploymentTarget,
    registry: &AgentRegistry,
    config: &Config,
) -> Result<RepairReport> {
    let before = check(target)?;
    let non_ok = before.non_ok();

    if non_ok.is_empty() {
        return Ok(RepairReport::default());
    }

    let root = target.root()?;
    let guard = locks::acquire_lock(
        &root.join(LOCK_FILE),
        &LockMetadata::new("repair"),
        config.lock_stale_minutes,
    )?;
    let mut store = RecordStore::load(&root)?;
    let mut report = RepairReport::default();
    let timeout = Duration::from_millis(config.fs_timeout_ms);

    for entry in non_ok {
        let id = &entry.agent_id;

        let Some(record) = store.get(id).cloned() else {
            // Store changed between check and lock acquisition.
            continue;
        };

        let Some(definition) = registry.lookup(id) else {
            report.failed.push(
                EntryOutcome::new(id, EntryStatus::Failed).with_message(format!(
                    "agent '{}' is no longer in the registry; uninstall it or restore the hub file",
                    id
                )),
            );
            continue;
        };

        let op_source = definition.source_path.clone();
        let op_dest = deploy::entry_path(&root, id);
        let mode = record.mode;
        let result = run_with_timeout_retries("repair entry", timeout, config.timeout_retries, move || {
            deploy::place_entry(&op_source, &op_dest, mode)
        })
        .and_then(|()| deploy::record_for(id, &definition.source_path, record.mode));

        match result {
            Ok(fresh) => {
                store.upsert(fresh);
                report.repaired.push(id.clone());
            }
            Err(e) => {
                report.failed.push(
                    EntryOutcome::new(id, EntryStatus::Failed).with_message(e.to_string()),
                );
            }
        }
    }

    store.save(&root)?;
    events::append_event(
        &root,
        &Event::new(EventAction::Repair).with_details(json!({
            "repaired": report.repaired.len(),
            "failed": report.failed.len(),
        })),
    )?;
    guard.release()?;

    Ok(report)
}

fn classify_entry(record: &InstallationRecord, dest: &Path) -> Result<HealthStatus> {
    if std::fs::symlink_metadata(dest).is_err() {
        return Ok(HealthStatus::Missing);
    }

    match record.mode {
        DeployMode::Symlink => {
            let Ok(link) = std::fs::read_link(dest) else {
                // A regular file where a symlink is expected.
                return Ok(HealthStatus::Drifted);
            };

            if record.link_target.as_deref() != Some(link.as_path()) {
                return Ok(HealthStatus::Drifted);
            }
            // dest.exists() follows the link.
            if !dest.exists() {
                return Ok(HealthStatus::BrokenLink);
            }
            Ok(HealthStatus::Ok)
        }
        DeployMode::Copy => {
            let meta = std::fs::symlink_metadata(dest).map_err(|e| {
                AgentryError::Deployment(format!(
                    "failed to inspect '{}': {}",
                    dest.display(),
                    e
                ))
            })?;
            if !meta.is_file() {
                return Ok(HealthStatus::Drifted);
            }

            let hash = deploy::hash_file(dest)?;
            if record.source_hash.as_deref() == Some(hash.as_str()) {
                Ok(HealthStatus::Ok)
            } else {
                Ok(HealthStatus::Drifted)
            }
        }
    }
}

/// Untracked `.md` files in the target root. Record store, lock, audit log,
/// and backups are bookkeeping, not foreign files.
fn foreign_files(root: &Path, store: &RecordStore) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        AgentryError::Deployment(format!(
            "failed to read target root '{}': {}",
            root.display(),
            e
        ))
    })?;

    let mut foreign = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AgentryError::Deployment(format!("failed to read target entry: {}", e))
        })?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') || name == events::EVENTS_FILE || name.contains(".bak.") {
            continue;
        }

        let tracked = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| store.get(stem).is_some());
        if !tracked {
            foreign.push(path);
        }
    }

    foreign.sort();
    Ok(foreign)
}
