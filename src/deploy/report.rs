//! Install and uninstall reports.
//!
//! Per-agent outcomes aggregate into a report with an overall status;
//! a failure for one agent never aborts the batch.

use serde::Serialize;
use std::fmt;

/// Outcome status for a single agent entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    /// The destination did not exist and was created.
    Created,
    /// The destination existed, was backed up, and was overwritten.
    Updated,
    /// The destination already matches the desired state.
    Unchanged,
    /// A foreign file occupies the destination and `--force` was not given.
    SkippedConflict,
    /// The entry could not be installed; see the message.
    Failed,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Created => write!(f, "created"),
            EntryStatus::Updated => write!(f, "updated"),
            EntryStatus::Unchanged => write!(f, "unchanged"),
            EntryStatus::SkippedConflict => write!(f, "skipped-conflict"),
            EntryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The outcome for one agent in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    pub agent_id: String,
    pub status: EntryStatus,
    /// Failure reason or conflict detail, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EntryOutcome {
    pub fn new(agent_id: &str, status: EntryStatus) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            status,
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Overall batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every entry succeeded (or was unchanged).
    Success,
    /// Some entries succeeded, some failed or were skipped.
    Partial,
    /// Every entry failed or was skipped.
    Failure,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Success => write!(f, "success"),
            OverallStatus::Partial => write!(f, "partial"),
            OverallStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Aggregated outcome of an install (or uninstall) batch.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub entries: Vec<EntryOutcome>,

    /// Whether this was a dry run (classification only, no filesystem work).
    pub dry_run: bool,

    /// Whether the batch stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl InstallReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            entries: Vec::new(),
            dry_run,
            cancelled: false,
        }
    }

    pub fn push(&mut self, outcome: EntryOutcome) {
        self.entries.push(outcome);
    }

    /// Count of entries with a given status.
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Entries that changed the filesystem (created or updated).
    pub fn modified_count(&self) -> usize {
        self.count(EntryStatus::Created) + self.count(EntryStatus::Updated)
    }

    /// Overall success/partial/failure classification.
    pub fn overall(&self) -> OverallStatus {
        let bad = self.count(EntryStatus::Failed) + self.count(EntryStatus::SkippedConflict);
        if bad == 0 {
            OverallStatus::Success
        } else if bad == self.entries.len() && !self.entries.is_empty() {
            OverallStatus::Failure
        } else {
            OverallStatus::Partial
        }
    }
}

/// Aggregated outcome of an uninstall batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UninstallReport {
    /// Entries removed along with their records.
    pub removed: Vec<String>,

    /// Requested ids with no record in this target; never touched.
    pub untracked: Vec<String>,

    /// Entries whose removal failed.
    pub failed: Vec<EntryOutcome>,
}

impl UninstallReport {
    pub fn overall(&self) -> OverallStatus {
        if self.failed.is_empty() {
            OverallStatus::Success
        } else if self.removed.is_empty() {
            OverallStatus::Failure
        } else {
            OverallStatus::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_success() {
        let report = InstallReport::new(false);
        assert_eq!(report.overall(), OverallStatus::Success);
        assert_eq!(report.modified_count(), 0);
    }

    #[test]
    fn mixed_outcomes_are_partial() {
        let mut report = InstallReport::new(false);
        report.push(EntryOutcome::new("a", EntryStatus::Created));
        report.push(EntryOutcome::new("b", EntryStatus::Failed).with_message("denied".into()));

        assert_eq!(report.overall(), OverallStatus::Partial);
        assert_eq!(report.modified_count(), 1);
    }

    #[test]
    fn all_failed_is_failure() {
        let mut report = InstallReport::new(false);
        report.push(EntryOutcome::new("a", EntryStatus::Failed));
        report.push(EntryOutcome::new("b", EntryStatus::SkippedConflict));

        assert_eq!(report.overall(), OverallStatus::Failure);
    }

    #[test]
    fn unchanged_entries_still_succeed() {
        let mut report = InstallReport::new(false);
        report.push(EntryOutcome::new("a", EntryStatus::Unchanged));

        assert_eq!(report.overall(), OverallStatus::Success);
        assert_eq!(report.modified_count(), 0);
    }
}
