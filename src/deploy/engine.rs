//! The deployment engine.
//!
//! `install` materializes a resolved agent set into a target root, one agent
//! at a time in resolved order. Sequential processing is a correctness
//! requirement: later agents must see conflicts created earlier in the same
//! batch. A per-agent failure is recorded and the batch continues.
//!
//! All mutation happens under the record-store lock. Filesystem steps run
//! with a bounded timeout and a small retry budget so a hung mount surfaces
//! as a per-entry failure instead of wedging the whole batch.

use crate::config::Config;
use crate::error::{AgentryError, Result};
use crate::events::{self, Event, EventAction};
use crate::fs::run_with_timeout_retries;
use crate::locks::{self, LockMetadata};
use crate::records::{InstallationRecord, RecordStore};
use crate::registry::AgentRegistry;
use chrono::Utc;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::report::{EntryOutcome, EntryStatus, InstallReport, UninstallReport};
use super::target::{DeployMode, DeploymentTarget};

/// Filename of the advisory lock guarding record-store mutations.
pub const LOCK_FILE: &str = ".installed.lock";

/// Cooperative cancellation flag.
///
/// Cancellation is coarse-grained: it stops the next not-yet-started agent
/// but lets an in-flight entry finish, so no half-written entry is left
/// behind.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for an install batch.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Overwrite foreign files occupying destinations.
    pub force: bool,

    /// Classify only; never touch the filesystem.
    pub dry_run: bool,

    /// Checked between agents.
    pub cancel: CancelFlag,
}

/// What classification decided should happen for one entry.
enum PlannedAction {
    Create,
    /// Overwrite; `backup` when an existing entry must be preserved first.
    Update { backup: bool },
    Unchanged,
    Conflict,
}

/// Install a resolved agent set into a deployment target.
///
/// The scope/mode combination is validated before any filesystem work.
/// Dry runs classify against the current record store and report the action
/// each entry would take.
pub fn install(
    registry: &AgentRegistry,
    ordered_ids: &[String],
    target: &DeploymentTarget,
    config: &Config,
    options: &InstallOptions,
) -> Result<InstallReport> {
    target.validate()?;
    let root = target.root()?;

    if options.dry_run {
        return dry_run_install(registry, ordered_ids, target, &root, options);
    }

    std::fs::create_dir_all(&root).map_err(|e| {
        AgentryError::Deployment(format!(
            "failed to create target root '{}': {}",
            root.display(),
            e
        ))
    })?;

    let guard = locks::acquire_lock(
        &root.join(LOCK_FILE),
        &LockMetadata::new("install"),
        config.lock_stale_minutes,
    )?;
    let mut store = RecordStore::load(&root)?;
    let mut report = InstallReport::new(false);

    let timeout = Duration::from_millis(config.fs_timeout_ms);

    for id in ordered_ids {
        if options.cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let Some(definition) = registry.lookup(id) else {
            report.push(
                EntryOutcome::new(id, EntryStatus::Failed)
                    .with_message(format!("agent '{}' is not in the registry", id)),
            );
            continue;
        };

        let dest = entry_path(&root, id);
        let action = match classify(&store, id, &definition.source_path, &dest, target.mode) {
            Ok(action) => action,
            Err(e) => {
                report.push(
                    EntryOutcome::new(id, EntryStatus::Failed).with_message(e.to_string()),
                );
                continue;
            }
        };

        match action {
            PlannedAction::Unchanged => {
                report.push(EntryOutcome::new(id, EntryStatus::Unchanged));
            }
            PlannedAction::Conflict => {
                if options.force {
                    apply_and_record(
                        &mut store,
                        &mut report,
                        definition.source_path.clone(),
                        dest,
                        id,
                        target.mode,
                        true,
                        EntryStatus::Updated,
                        timeout,
                        config.timeout_retries,
                    );
                } else {
                    report.push(
                        EntryOutcome::new(id, EntryStatus::SkippedConflict).with_message(format!(
                            "'{}' exists but is not tracked; pass --force to overwrite",
                            dest.display()
                        )),
                    );
                }
            }
            PlannedAction::Create => {
                apply_and_record(
                    &mut store,
                    &mut report,
                    definition.source_path.clone(),
                    dest,
                    id,
                    target.mode,
                    false,
                    EntryStatus::Created,
                    timeout,
                    config.timeout_retries,
                );
            }
            PlannedAction::Update { backup } => {
                apply_and_record(
                    &mut store,
                    &mut report,
                    definition.source_path.clone(),
                    dest,
                    id,
                    target.mode,
                    backup,
                    EntryStatus::Updated,
                    timeout,
                    config.timeout_retries,
                );
            }
        }
    }

    store.save(&root)?;
    events::append_event(
        &root,
        &Event::new(EventAction::Install).with_details(json!({
            "mode": target.mode.to_string(),
            "created": report.count(EntryStatus::Created),
            "updated": report.count(EntryStatus::Updated),
            "unchanged": report.count(EntryStatus::Unchanged),
            "skipped": report.count(EntryStatus::SkippedConflict),
            "failed": report.count(EntryStatus::Failed),
            "cancelled": report.cancelled,
        })),
    )?;
    guard.release()?;

    Ok(report)
}

/// Classification-only pass for `--dry-run`. Reads the record store and the
/// destination directory but never writes.
fn dry_run_install(
    registry: &AgentRegistry,
    ordered_ids: &[String],
    target: &DeploymentTarget,
    root: &Path,
    options: &InstallOptions,
) -> Result<InstallReport> {
    let store = RecordStore::load(root)?;
    let mut report = InstallReport::new(true);

    for id in ordered_ids {
        let Some(definition) = registry.lookup(id) else {
            report.push(
                EntryOutcome::new(id, EntryStatus::Failed)
                    .with_message(format!("agent '{}' is not in the registry", id)),
            );
            continue;
        };

        let dest = entry_path(root, id);
        match classify(&store, id, &definition.source_path, &dest, target.mode) {
            Ok(PlannedAction::Create) => {
                report.push(EntryOutcome::new(id, EntryStatus::Created));
            }
            Ok(PlannedAction::Update { .. }) => {
                report.push(EntryOutcome::new(id, EntryStatus::Updated));
            }
            Ok(PlannedAction::Unchanged) => {
                report.push(EntryOutcome::new(id, EntryStatus::Unchanged));
            }
            Ok(PlannedAction::Conflict) => {
                if options.force {
                    report.push(EntryOutcome::new(id, EntryStatus::Updated));
                } else {
                    report.push(
                        EntryOutcome::new(id, EntryStatus::SkippedConflict)
                            .with_message(format!("'{}' exists but is not tracked", dest.display())),
                    );
                }
            }
            Err(e) => {
                report.push(
                    EntryOutcome::new(id, EntryStatus::Failed).with_message(e.to_string()),
                );
            }
        }
    }

    Ok(report)
}

/// Remove tracked entries from a target.
///
/// `ids` of `None` removes every tracked entry. Untracked ids are reported,
/// not failed; foreign files are never touched.
pub fn uninstall(
    target: &DeploymentTarget,
    ids: Option<&[String]>,
    config: &Config,
) -> Result<UninstallReport> {
    let root = target.root()?;
    let mut report = UninstallReport::default();

    if !root.is_dir() {
        if let Some(ids) = ids {
            report.untracked = ids.to_vec();
        }
        return Ok(report);
    }

    let guard = locks::acquire_lock(
        &root.join(LOCK_FILE),
        &LockMetadata::new("uninstall"),
        config.lock_stale_minutes,
    )?;
    let mut store = RecordStore::load(&root)?;
    let timeout = Duration::from_millis(config.fs_timeout_ms);

    let requested: Vec<String> = match ids {
        Some(ids) => ids.to_vec(),
        None => store.iter().map(|r| r.agent_id.clone()).collect(),
    };

    for id in &requested {
        if store.get(id).is_none() {
            report.untracked.push(id.clone());
            continue;
        }

        let op_dest = entry_path(&root, id);
        match run_with_timeout_retries("remove entry", timeout, config.timeout_retries, move || {
            remove_entry(&op_dest)
        }) {
            Ok(()) => {
                store.remove(id);
                report.removed.push(id.clone());
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
        &Event::new(EventAction::Uninstall).with_details(json!({
            "removed": report.removed.len(),
            "untracked": report.untracked.len(),
            "failed": report.failed.len(),
        })),
    )?;
    guard.release()?;

    Ok(report)
}

/// Destination path for an agent inside a target root.
pub(crate) fn entry_path(root: &Path, agent_id: &str) -> PathBuf {
    root.join(format!("{}.md", agent_id))
}

/// Decide what to do for one entry.
fn classify(
    store: &RecordStore,
    agent_id: &str,
    source: &Path,
    dest: &Path,
    mode: DeployMode,
) -> Result<PlannedAction> {
    // symlink_metadata: a broken symlink still counts as present.
    let exists = std::fs::symlink_metadata(dest).is_ok();
    let tracked = store.get(agent_id);

    if !exists {
        // Tracked-but-missing is recreated, same as a fresh install.
        return Ok(PlannedAction::Create);
    }

    let Some(record) = tracked else {
        return Ok(PlannedAction::Conflict);
    };

    if record.mode == mode && entry_matches(source, dest, mode)? {
        return Ok(PlannedAction::Unchanged);
    }

    Ok(PlannedAction::Update { backup: true })
}

/// Whether the on-disk entry already matches the desired source and mode.
fn entry_matches(source: &Path, dest: &Path, mode: DeployMode) -> Result<bool> {
    match mode {
        DeployMode::Symlink => match std::fs::read_link(dest) {
            Ok(link) => Ok(link == source),
            // Not a symlink, or unreadable: needs reinstall.
            Err(_) => Ok(false),
        },
        DeployMode::Copy => {
            let meta = std::fs::symlink_metadata(dest).map_err(|e| {
                AgentryError::Deployment(format!(
                    "failed to inspect '{}': {}",
                    dest.display(),
                    e
                ))
            })?;
            if !meta.is_file() {
                return Ok(false);
            }
            Ok(hash_file(dest)? == hash_file(source)?)
        }
    }
}

/// Apply one create/update under the timeout budget and record the result.
#[allow(clippy::too_many_arguments)]
fn apply_and_record(
    store: &mut RecordStore,
    report: &mut InstallReport,
    source: PathBuf,
    dest: PathBuf,
    agent_id: &str,
    mode: DeployMode,
    backup: bool,
    success_status: EntryStatus,
    timeout: Duration,
    retries: u32,
) {
    let op_source = source.clone();
    let op_dest = dest.clone();

    let result = run_with_timeout_retries("install entry", timeout, retries, move || {
        if backup {
            backup_entry(&op_dest)?;
        }
        place_entry(&op_source, &op_dest, mode)
    });

    match result.and_then(|()| record_for(agent_id, &source, mode)) {
        Ok(record) => {
            store.upsert(record);
            report.push(EntryOutcome::new(agent_id, success_status));
        }
        Err(e) => {
            report.push(
                EntryOutcome::new(agent_id, EntryStatus::Failed).with_message(e.to_string()),
            );
        }
    }
}

/// Move an existing destination aside as a timestamped backup.
///
/// A missing destination is fine; a retried attempt may already have moved
/// it.
fn backup_entry(dest: &Path) -> Result<()> {
    if std::fs::symlink_metadata(dest).is_err() {
        return Ok(());
    }

    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    let backup = dest.with_file_name(format!(
        "{}.bak.{}",
        name,
        Utc::now().format("%Y%m%d%H%M%S")
    ));

    std::fs::rename(dest, &backup).map_err(|e| {
        AgentryError::Deployment(format!(
            "failed to back up '{}' to '{}': {}",
            dest.display(),
            backup.display(),
            e
        ))
    })
}

/// Materialize one entry: symlink to the hub source, or byte copy.
///
/// Any stale destination is removed first so retries converge.
pub(crate) fn place_entry(source: &Path, dest: &Path, mode: DeployMode) -> Result<()> {
    if std::fs::symlink_metadata(dest).is_ok() {
        std::fs::remove_file(dest).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to remove stale entry '{}': {}",
                dest.display(),
                e
            ))
        })?;
    }

    match mode {
        DeployMode::Symlink => std::os::unix::fs::symlink(source, dest).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to link '{}' -> '{}': {}",
                dest.display(),
                source.display(),
                e
            ))
        }),
        DeployMode::Copy => std::fs::copy(source, dest).map(|_| ()).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to copy '{}' to '{}': {}",
                source.display(),
                dest.display(),
                e
            ))
        }),
    }
}

/// Remove one installed entry. A missing file is not an error; the record
/// is removed either way.
fn remove_entry(dest: &Path) -> Result<()> {
    match std::fs::remove_file(dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AgentryError::Deployment(format!(
            "failed to remove '{}': {}",
            dest.display(),
            e
        ))),
    }
}

/// Build the installation record for a freshly placed entry.
pub(crate) fn record_for(
    agent_id: &str,
    source: &Path,
    mode: DeployMode,
) -> Result<InstallationRecord> {
    Ok(InstallationRecord {
        agent_id: agent_id.to_string(),
        mode,
        source_hash: match mode {
            DeployMode::Copy => Some(hash_file(source)?),
            DeployMode::Symlink => None,
        },
        link_target: match mode {
            DeployMode::Symlink => Some(source.to_path_buf()),
            DeployMode::Copy => None,
        },
        installed_at: Utc::now(),
    })
}

/// blake3 hash of a file's content, hex encoded.
pub(crate) fn hash_file(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| {
        AgentryError::Deployment(format!("failed to read '{}': {}", path.display(), e))
    })?;

    Ok(blake3::hash(&content).to_hex().to_string())
}
