//! Error types for the agentry CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Resolution-phase errors (registry/profile) are fail-closed and abort the
//! whole request with exit code 2. Deployment-phase errors are fail-open
//! per-entry and aggregated into reports; only batch-level failures (lock
//! contention, record-store corruption) surface as errors here.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for agentry operations.
#[derive(Error, Debug)]
pub enum AgentryError {
    /// The hub root could not be located or loaded.
    #[error(
        "failed to load agent registry: {0}\n\
         Set AGENTRY_HUB to the hub directory containing agents/ and profiles/."
    )]
    RegistryLoad(String),

    /// Two agent files under the same scope declare the same id.
    #[error(
        "duplicate agent id '{id}' in the same scope:\n  {first}\n  {second}\n\
         Rename or remove one of the files."
    )]
    DuplicateAgentId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A profile file could not be parsed.
    #[error("failed to parse profile: {0}")]
    ProfileParse(String),

    /// A named profile does not exist in the hub.
    #[error("unknown profile '{0}' — run `agentry profiles` to see available profiles")]
    UnknownProfile(String),

    /// A profile references an agent id absent from the registry.
    #[error("unknown agent '{0}' — run `agentry agents` to see available ids")]
    UnknownAgent(String),

    /// Invalid target or option combination, rejected before touching disk.
    #[error("{0}")]
    Validation(String),

    /// Batch-level deployment failure (record store, target root).
    #[error("deployment failed: {0}")]
    Deployment(String),

    /// The record-store lock could not be acquired.
    #[error("lock acquisition failed: {0}")]
    Lock(String),

    /// A bounded filesystem operation did not complete in time.
    #[error("operation timed out: {0}")]
    Timeout(String),
}

impl AgentryError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentryError::RegistryLoad(_)
            | AgentryError::DuplicateAgentId { .. }
            | AgentryError::ProfileParse(_)
            | AgentryError::UnknownProfile(_)
            | AgentryError::UnknownAgent(_) => exit_codes::RESOLUTION_FAILURE,
            AgentryError::Validation(_)
            | AgentryError::Deployment(_)
            | AgentryError::Lock(_)
            | AgentryError::Timeout(_) => exit_codes::OPERATION_FAILURE,
        }
    }
}

/// Result type alias for agentry operations.
pub type Result<T> = std::result::Result<T, AgentryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_exit_two() {
        let err = AgentryError::UnknownAgent("nextjs-pro".to_string());
        assert_eq!(err.exit_code(), exit_codes::RESOLUTION_FAILURE);

        let err = AgentryError::UnknownProfile("backend".to_string());
        assert_eq!(err.exit_code(), exit_codes::RESOLUTION_FAILURE);

        let err = AgentryError::RegistryLoad("hub not found".to_string());
        assert_eq!(err.exit_code(), exit_codes::RESOLUTION_FAILURE);
    }

    #[test]
    fn operation_errors_exit_one() {
        let err = AgentryError::Validation("copy mode not allowed".to_string());
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILURE);

        let err = AgentryError::Lock("held by another process".to_string());
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILURE);
    }

    #[test]
    fn error_messages_carry_remediation() {
        let err = AgentryError::UnknownAgent("missing-one".to_string());
        assert!(err.to_string().contains("agentry agents"));

        let err = AgentryError::RegistryLoad("no such directory".to_string());
        assert!(err.to_string().contains("AGENTRY_HUB"));
    }

    #[test]
    fn duplicate_agent_id_names_both_paths() {
        let err = AgentryError::DuplicateAgentId {
            id: "code-reviewer".to_string(),
            first: PathBuf::from("/hub/agents/core/code-reviewer.md"),
            second: PathBuf::from("/hub/agents/development/code-reviewer.md"),
        };
        let msg = err.to_string();
        assert!(msg.contains("core/code-reviewer.md"));
        assert!(msg.contains("development/code-reviewer.md"));
    }
}
