//! Atomic filesystem writes for agentry.
//!
//! The installation-record store and audit log must never be left half
//! written by a crash. All writes follow the same pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Atomically rename over the original file
//!
//! Source and destination must be on the same filesystem for the rename to
//! be atomic. On crash, a temporary file named `.{filename}.tmp` may remain.

use crate::error::{AgentryError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Atomically write bytes to a file.
///
/// Writes to a temporary sibling file, syncs it, then renames it over the
/// target so the target is never observed in a partial state.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AgentryError::Deployment(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    // Sync the parent directory so the rename itself is durable.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Generate a temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> Result<std::path::PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AgentryError::Deployment("invalid file path".to_string()))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        AgentryError::Deployment(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        AgentryError::Deployment(format!("failed to write to temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        AgentryError::Deployment(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}
