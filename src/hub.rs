//! Hub and environment resolution for agentry.
//!
//! The hub is the canonical, single-source-of-truth directory of agent
//! definitions. Every command resolves a [`HubContext`] first, so operations
//! always target the same hub regardless of the working directory.
//!
//! The hub root comes from the `AGENTRY_HUB` environment variable. A missing
//! or nonexistent hub is a fatal startup error with actionable guidance,
//! never a silently empty registry.

use crate::error::{AgentryError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable locating the hub root.
pub const HUB_ENV_VAR: &str = "AGENTRY_HUB";

/// Environment variable overriding the global installation root.
pub const HOME_ENV_VAR: &str = "AGENTRY_HOME";

/// Agent definitions directory name within the hub.
pub const AGENTS_DIR: &str = "agents";

/// Profiles directory name within the hub.
pub const PROFILES_DIR: &str = "profiles";

/// Fixed, ordered list of category subdirectories scanned at registry load.
pub const CATEGORY_DIRS: [&str; 3] = ["core", "development", "specialists"];

/// Resolved paths for the agentry hub.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct HubContext {
    /// Absolute path to the hub root.
    pub root: PathBuf,

    /// Absolute path to the agent definitions directory (`<hub>/agents`).
    pub agents_dir: PathBuf,

    /// Absolute path to the profiles directory (`<hub>/profiles`).
    pub profiles_dir: PathBuf,
}

impl HubContext {
    /// Resolve the hub context from the environment.
    ///
    /// # Returns
    ///
    /// * `Ok(HubContext)` - Successfully resolved hub
    /// * `Err(AgentryError::RegistryLoad)` - `AGENTRY_HUB` unset or invalid (exit code 2)
    pub fn resolve() -> Result<Self> {
        let root = env::var(HUB_ENV_VAR).map_err(|_| {
            AgentryError::RegistryLoad(format!("{} is not set", HUB_ENV_VAR))
        })?;

        Self::resolve_from(root)
    }

    /// Resolve the hub context from a specific root path.
    ///
    /// This is the entry point for tests and for callers that already know
    /// the hub location.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if !root.is_dir() {
            return Err(AgentryError::RegistryLoad(format!(
                "hub directory '{}' does not exist",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            AgentryError::RegistryLoad(format!(
                "failed to canonicalize hub path '{}': {}",
                root.display(),
                e
            ))
        })?;

        let agents_dir = root.join(AGENTS_DIR);
        if !agents_dir.is_dir() {
            return Err(AgentryError::RegistryLoad(format!(
                "hub at '{}' has no {}/ directory",
                root.display(),
                AGENTS_DIR
            )));
        }

        let profiles_dir = root.join(PROFILES_DIR);

        Ok(Self {
            root,
            agents_dir,
            profiles_dir,
        })
    }

    /// Ordered category root directories under the hub.
    ///
    /// The order is fixed so registry load (and therefore duplicate
    /// detection) is deterministic.
    pub fn category_roots(&self) -> Vec<PathBuf> {
        CATEGORY_DIRS
            .iter()
            .map(|c| self.agents_dir.join(c))
            .collect()
    }

    /// Path to a named profile file (`<hub>/profiles/<name>.profile`).
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{}.profile", name))
    }

    /// Path to the hub configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }
}

/// Resolve the global installation root.
///
/// Uses `AGENTRY_HOME` when set, otherwise `~/.agentry`. The `agents`
/// subdirectory of that root is the global deployment target.
pub fn global_root() -> Result<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV_VAR) {
        return Ok(PathBuf::from(home).join(AGENTS_DIR));
    }

    let home = dirs::home_dir().ok_or_else(|| {
        AgentryError::Validation(format!(
            "could not determine home directory; set {} to choose a global install root",
            HOME_ENV_VAR
        ))
    })?;

    Ok(home.join(".agentry").join(AGENTS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_hub;
    use serial_test::serial;

    #[test]
    fn resolve_from_valid_hub() {
        let hub = create_test_hub();
        let ctx = HubContext::resolve_from(hub.path()).unwrap();

        assert!(ctx.agents_dir.ends_with("agents"));
        assert!(ctx.profiles_dir.ends_with("profiles"));
    }

    #[test]
    fn resolve_from_missing_dir_fails() {
        let result = HubContext::resolve_from("/nonexistent/agentry-hub");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, AgentryError::RegistryLoad(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn resolve_from_dir_without_agents_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = HubContext::resolve_from(temp.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("agents"));
    }

    #[test]
    fn category_roots_are_ordered() {
        let hub = create_test_hub();
        let ctx = HubContext::resolve_from(hub.path()).unwrap();

        let roots = ctx.category_roots();
        assert_eq!(roots.len(), 3);
        assert!(roots[0].ends_with("core"));
        assert!(roots[1].ends_with("development"));
        assert!(roots[2].ends_with("specialists"));
    }

    #[test]
    fn profile_path_appends_extension() {
        let hub = create_test_hub();
        let ctx = HubContext::resolve_from(hub.path()).unwrap();

        let path = ctx.profile_path("backend");
        assert!(path.ends_with("backend.profile"));
    }

    #[test]
    #[serial]
    fn resolve_reads_env_var() {
        let hub = create_test_hub();
        // SAFETY: guarded by #[serial]; no other thread reads the env here.
        unsafe { env::set_var(HUB_ENV_VAR, hub.path()) };

        let ctx = HubContext::resolve().unwrap();
        assert_eq!(ctx.root, hub.path().canonicalize().unwrap());

        unsafe { env::remove_var(HUB_ENV_VAR) };
    }

    #[test]
    #[serial]
    fn resolve_without_env_var_fails_with_guidance() {
        unsafe { env::remove_var(HUB_ENV_VAR) };

        let result = HubContext::resolve();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains(HUB_ENV_VAR));
    }

    #[test]
    #[serial]
    fn global_root_honors_home_override() {
        unsafe { env::set_var(HOME_ENV_VAR, "/tmp/agentry-home") };

        let root = global_root().unwrap();
        assert_eq!(root, PathBuf::from("/tmp/agentry-home/agents"));

        unsafe { env::remove_var(HOME_ENV_VAR) };
    }
}
