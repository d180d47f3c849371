//! Audit logging for agentry.
//!
//! Mutating operations (install, repair, uninstall) append events to an
//! NDJSON log (`events.ndjson`, one JSON object per line) in the deployment
//! target root. The log is diagnostic output and is strictly separate from
//! any command's data channel: commands print contract-specified results to
//! stdout and never interleave event or log text with them.
//!
//! Each event carries:
//! - `ts`: RFC3339 timestamp
//! - `action`: the operation performed
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `details`: freeform object with operation-specific details

use crate::error::{AgentryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Name of the audit log file within a deployment target root.
pub const EVENTS_FILE: &str = "events.ndjson";

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Agents installed into a target.
    Install,
    /// Agents removed from a target.
    Uninstall,
    /// Non-ok entries reinstalled.
    Repair,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Install => write!(f, "install"),
            EventAction::Uninstall => write!(f, "uninstall"),
            EventAction::Repair => write!(f, "repair"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            AgentryError::Deployment(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Actor string for event metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the audit log in the given target root.
///
/// The file is created if it doesn't exist. Each append results in one line
/// with a trailing newline. Events should be appended while the record-store
/// lock is held so the log and store move together.
pub fn append_event(target_root: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if !target_root.exists() {
        std::fs::create_dir_all(target_root).map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to create target root '{}': {}",
                target_root.display(),
                e
            ))
        })?;
    }

    let events_file = target_root.join(EVENTS_FILE);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            AgentryError::Deployment(format!(
                "failed to open events log '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        AgentryError::Deployment(format!("failed to append to events log: {}", e))
    })?;

    Ok(())
}
