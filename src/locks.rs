//! Locking for the installation-record store.
//!
//! Every deployment target keeps one record store, and mutating operations
//! (install, repair, uninstall) follow a single-writer discipline: an
//! exclusive advisory lock file next to the store is held for the duration
//! of the mutation. Readers (`health`, `profiles`) run lock-free against a
//! consistent snapshot because the store itself is replaced atomically.
//!
//! Lock files are created with **create_new** semantics (exclusive create)
//! so only one process can hold a given lock. Each lock file contains JSON
//! metadata (owner, pid, created_at, action) used for diagnostics when a
//! second acquisition fails.
//!
//! Locks are managed through an RAII guard that deletes the lock file on
//! drop. If deletion fails during drop a warning is printed to stderr.

use crate::error::{AgentryError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Lock metadata stored in lock files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Timestamp when the lock was created (RFC3339).
    pub created_at: DateTime<Utc>,

    /// The mutating action being performed (install/repair/uninstall).
    pub action: String,
}

impl LockMetadata {
    /// Create new lock metadata with the current timestamp.
    pub fn new(action: &str) -> Self {
        Self {
            owner: owner_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            action: action.to_string(),
        }
    }

    /// Parse lock metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AgentryError::Lock(format!(
                "failed to read lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AgentryError::Lock(format!(
                "failed to parse lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Serialize lock metadata to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AgentryError::Lock(format!("failed to serialize lock metadata: {}", e)))
    }

    /// Age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Whether the lock exceeds the staleness threshold in minutes.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > stale_minutes as i64
    }
}

/// Owner string for lock metadata.
fn owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// RAII guard for a lock file.
///
/// When dropped, the lock file is deleted. If deletion fails, a warning is
/// printed but no panic occurs.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manually release the lock, surfacing deletion errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            AgentryError::Lock(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Acquire an exclusive lock file using create_new semantics.
///
/// `stale_minutes` is the staleness threshold used when reporting an
/// existing lock: a holder older than the threshold is flagged `[STALE]`
/// in the contention message so the operator knows clearing it is safe.
///
/// # Returns
///
/// * `Ok(LockGuard)` - Successfully acquired lock with RAII guard
/// * `Err(AgentryError::Lock)` - Lock already exists (exit code 1)
pub fn acquire_lock(
    lock_path: &Path,
    metadata: &LockMetadata,
    stale_minutes: u32,
) -> Result<LockGuard> {
    if let Some(parent) = lock_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AgentryError::Lock(format!(
                "failed to create lock directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                // Read the existing lock metadata for a helpful error message.
                let existing_info = match LockMetadata::from_file(lock_path) {
                    Ok(meta) => {
                        let stale_marker = if meta.is_stale(stale_minutes) {
                            " [STALE]"
                        } else {
                            ""
                        };
                        format!(
                            "\nLock: {} (created {} ago by {}){}\nAction: {}",
                            lock_path.display(),
                            meta.age_string(),
                            meta.owner,
                            stale_marker,
                            meta.action
                        )
                    }
                    Err(_) => format!("\nLock: {}", lock_path.display()),
                };
                AgentryError::Lock(format!("lock is held by another process{}", existing_info))
            } else {
                AgentryError::Lock(format!(
                    "failed to acquire lock '{}': {}",
                    lock_path.display(),
                    e
                ))
            }
        })?;

    let json = metadata.to_json()?;
    file.write_all(json.as_bytes()).map_err(|e| {
        let _ = fs::remove_file(lock_path);
        AgentryError::Lock(format!("failed to write lock metadata: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(lock_path);
        AgentryError::Lock(format!("failed to sync lock file: {}", e))
    })?;

    Ok(LockGuard::new(lock_path.to_path_buf()))
}
