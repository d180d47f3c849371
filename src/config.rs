//! Hub configuration for agentry.
//!
//! Represents the contents of `<hub>/config.yaml`. The file is optional and
//! every field has a default; unknown fields are ignored for forward
//! compatibility.

use crate::deploy::DeployMode;
use crate::error::{AgentryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for agentry operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bound in milliseconds on any single filesystem operation performed
    /// by the deployment engine.
    pub fs_timeout_ms: u64,

    /// Retries before a per-entry timeout is reported as failed.
    pub timeout_retries: u32,

    /// Minutes after which a record-store lock is considered stale.
    pub lock_stale_minutes: u32,

    /// Deployment mode used when the CLI specifies neither --symlink nor --copy.
    pub default_mode: DeployMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fs_timeout_ms: 5000,
            timeout_retries: 2,
            lock_stale_minutes: 120,
            default_mode: DeployMode::Symlink,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentryError::Validation(format!(
                "failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| AgentryError::Validation(format!("failed to parse config.yaml: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.fs_timeout_ms == 0 {
            return Err(AgentryError::Validation(
                "config.yaml validation failed: fs_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
