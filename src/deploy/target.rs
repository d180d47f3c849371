//! Deployment targets.
//!
//! A target is the pair of a scope (where agents land) and a mode (how they
//! land). Targets are explicit values threaded through every engine call;
//! there is no ambient "current installation directory".

use crate::error::{AgentryError, Result};
use crate::hub;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Directory name for project-scope deployments inside a project root.
pub const PROJECT_AGENTS_DIR: &str = ".agents";

/// How an agent is materialized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Filesystem link back to the hub; hub updates propagate instantly.
    Symlink,
    /// Independent byte copy; isolated and offline-safe.
    Copy,
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Symlink => write!(f, "symlink"),
            DeployMode::Copy => write!(f, "copy"),
        }
    }
}

/// Where agents are deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentScope {
    /// The per-user global root (`$AGENTRY_HOME/agents` or `~/.agentry/agents`).
    Global,
    /// A project's `.agents` directory.
    Project(PathBuf),
}

/// A fully specified deployment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub scope: DeploymentScope,
    pub mode: DeployMode,
}

impl DeploymentTarget {
    pub fn new(scope: DeploymentScope, mode: DeployMode) -> Self {
        Self { scope, mode }
    }

    /// Validate the scope/mode combination.
    ///
    /// Global scope requires symlink mode: global installs exist to
    /// propagate hub updates instantly, which copies cannot do. The check
    /// runs before any filesystem work.
    pub fn validate(&self) -> Result<()> {
        if self.scope == DeploymentScope::Global && self.mode == DeployMode::Copy {
            return Err(AgentryError::Validation(
                "copy mode is not allowed for the global scope; use --symlink (global installs track the hub)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the target root directory.
    pub fn root(&self) -> Result<PathBuf> {
        match &self.scope {
            DeploymentScope::Global => hub::global_root(),
            DeploymentScope::Project(path) => Ok(path.join(PROJECT_AGENTS_DIR)),
        }
    }
}
