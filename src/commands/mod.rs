//! Command implementations for agentry.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the shared helpers every command needs: resolving
//! the hub context and turning CLI flags into scopes, modes, and profile
//! sources.
//!
//! Commands print contract-specified results to stdout only; warnings and
//! diagnostics go to stderr. Each handler returns the process exit code so
//! partial failures can exit non-zero without being errors.

mod agents;
mod health;
mod install;
mod profiles;
mod repair;
mod route;
mod uninstall;

use crate::cli::Command;
use crate::config::Config;
use crate::deploy::DeploymentScope;
use crate::error::{AgentryError, Result};
use crate::hub::HubContext;
use crate::profile::ProfileSource;
use crate::registry::{AgentRegistry, Category};
use std::path::PathBuf;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code on success; fatal errors propagate and are
/// mapped to exit codes in `main`.
pub fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::Install(args) => install::cmd_install(args),
        Command::Uninstall(args) => uninstall::cmd_uninstall(args),
        Command::Health(args) => health::cmd_health(args),
        Command::Repair(args) => repair::cmd_repair(args),
        Command::Profiles => profiles::cmd_profiles(),
        Command::ShowProfile(args) => profiles::cmd_show_profile(args),
        Command::Agents(args) => agents::cmd_agents(args),
        Command::Route(args) => route::cmd_route(args),
    }
}

/// Everything a command needs from the environment.
pub(crate) struct AppContext {
    pub hub: HubContext,
    pub config: Config,
    pub registry: AgentRegistry,
}

/// Resolve the hub, load its configuration, and load the registry.
pub(crate) fn load_app_context() -> Result<AppContext> {
    let hub = HubContext::resolve()?;
    let config = Config::load(hub.config_path())?;
    let registry = AgentRegistry::load(&hub.category_roots())?;

    Ok(AppContext {
        hub,
        config,
        registry,
    })
}

/// Parse a category name from the CLI.
pub(crate) fn parse_category(name: &str) -> Result<Category> {
    Category::from_dir_name(name).ok_or_else(|| {
        AgentryError::Validation(format!(
            "unknown category '{}'; expected one of core, development, specialists",
            name
        ))
    })
}

/// Turn the scope flags into a deployment scope.
///
/// With neither flag, the scope is the current directory's project.
pub(crate) fn resolve_scope(global: bool, project: Option<PathBuf>) -> Result<DeploymentScope> {
    if global {
        return Ok(DeploymentScope::Global);
    }

    let root = match project {
        Some(path) => path,
        None => std::env::current_dir().map_err(|e| {
            AgentryError::Validation(format!("could not determine current directory: {}", e))
        })?,
    };

    Ok(DeploymentScope::Project(root))
}

/// Turn the mutually exclusive source flags into a profile source.
pub(crate) fn profile_source(
    profile: Option<String>,
    category: Option<String>,
    profile_file: Option<PathBuf>,
) -> Result<ProfileSource> {
    if let Some(name) = profile {
        return Ok(ProfileSource::Named(name));
    }
    if let Some(name) = category {
        return Ok(ProfileSource::Category(parse_category(&name)?));
    }
    if let Some(path) = profile_file {
        return Ok(ProfileSource::File(path));
    }

    // clap's required group rules this out.
    Err(AgentryError::Validation(
        "no profile source given; pass --profile, --category, or --profile-file".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_accepts_known_names() {
        assert_eq!(parse_category("core").unwrap(), Category::Core);
        assert_eq!(parse_category("specialists").unwrap(), Category::Specialists);
    }

    #[test]
    fn category_parse_rejects_unknown_names() {
        let err = parse_category("backend").unwrap_err();
        assert!(err.to_string().contains("backend"));
        assert!(err.to_string().contains("core"));
    }

    #[test]
    fn scope_flags_map_to_scopes() {
        assert_eq!(
            resolve_scope(true, None).unwrap(),
            DeploymentScope::Global
        );
        assert_eq!(
            resolve_scope(false, Some(PathBuf::from("/work/app"))).unwrap(),
            DeploymentScope::Project(PathBuf::from("/work/app"))
        );
    }

    #[test]
    fn source_flags_map_to_sources() {
        assert_eq!(
            profile_source(Some("backend".into()), None, None).unwrap(),
            ProfileSource::Named("backend".into())
        );
        assert_eq!(
            profile_source(None, Some("core".into()), None).unwrap(),
            ProfileSource::Category(Category::Core)
        );
        assert_eq!(
            profile_source(None, None, Some(PathBuf::from("x.profile"))).unwrap(),
            ProfileSource::File(PathBuf::from("x.profile"))
        );
    }
}
