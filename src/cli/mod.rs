//! CLI argument parsing for agentry.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Agentry: deployment resolver and routing classifier for agent registries.
///
/// The hub (located by AGENTRY_HUB) is the single source of truth for agent
/// definitions. Agentry materializes profiles of agents into global or
/// per-project targets as symlinks or copies, keeps them healthy, and routes
/// free-text task descriptions to the right coordination tier.
#[derive(Parser, Debug)]
#[command(name = "agentry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for agentry.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install a profile of agents into a deployment target.
    ///
    /// Resolves the profile against the registry, then materializes each
    /// agent as a symlink or copy. Re-running is idempotent.
    Install(InstallArgs),

    /// Remove installed agents from a deployment target.
    ///
    /// Only tracked entries are removed; foreign files are never touched.
    Uninstall(UninstallArgs),

    /// Check the health of a deployment target.
    ///
    /// Classifies each tracked entry (ok, broken-link, drifted, missing)
    /// and reports untracked foreign files.
    Health(ScopeArgs),

    /// Repair a deployment target.
    ///
    /// Reinstalls every non-ok tracked entry with its recorded mode.
    Repair(ScopeArgs),

    /// List the profiles available in the hub.
    Profiles,

    /// Show one profile's metadata and agent list.
    ShowProfile(ShowProfileArgs),

    /// List the agents in the registry, grouped by category.
    Agents(AgentsArgs),

    /// Route a task description to a coordination tier.
    ///
    /// Prints the tier, target, and rationale. Always exits 0.
    Route(RouteArgs),
}

/// Arguments for the `install` command.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true)))]
#[command(group(ArgGroup::new("scope")))]
#[command(group(ArgGroup::new("mode")))]
pub struct InstallArgs {
    /// Named profile from the hub's profiles directory.
    #[arg(long, group = "source")]
    pub profile: Option<String>,

    /// Install every agent in one category (core, development, specialists).
    #[arg(long, group = "source")]
    pub category: Option<String>,

    /// Path to a profile file outside the hub.
    #[arg(long, group = "source", value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Install into the global root instead of a project.
    #[arg(long, group = "scope")]
    pub global: bool,

    /// Install into a project's .agents directory (default: current directory).
    #[arg(long, group = "scope", value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Install entries as symlinks back to the hub.
    #[arg(long, group = "mode")]
    pub symlink: bool,

    /// Install entries as independent copies.
    #[arg(long, group = "mode")]
    pub copy: bool,

    /// Overwrite foreign files occupying destinations.
    #[arg(long)]
    pub force: bool,

    /// Report what would happen without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `uninstall` command.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true)))]
#[command(group(ArgGroup::new("scope")))]
pub struct UninstallArgs {
    /// Named profile whose agents should be removed.
    #[arg(long, group = "source")]
    pub profile: Option<String>,

    /// Remove every agent in one category.
    #[arg(long, group = "source")]
    pub category: Option<String>,

    /// Path to a profile file listing the agents to remove.
    #[arg(long, group = "source", value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Remove every tracked entry in the target.
    #[arg(long, group = "source")]
    pub all: bool,

    /// Operate on the global root instead of a project.
    #[arg(long, group = "scope")]
    pub global: bool,

    /// Operate on a project's .agents directory (default: current directory).
    #[arg(long, group = "scope", value_name = "PATH")]
    pub project: Option<PathBuf>,
}

/// Scope selection shared by `health` and `repair`.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("scope")))]
pub struct ScopeArgs {
    /// Operate on the global root instead of a project.
    #[arg(long, group = "scope")]
    pub global: bool,

    /// Operate on a project's .agents directory (default: current directory).
    #[arg(long, group = "scope", value_name = "PATH")]
    pub project: Option<PathBuf>,
}

/// Arguments for the `show-profile` command.
#[derive(Parser, Debug)]
pub struct ShowProfileArgs {
    /// Profile name (without the .profile extension).
    pub name: String,
}

/// Arguments for the `agents` command.
#[derive(Parser, Debug)]
pub struct AgentsArgs {
    /// Limit the listing to one category.
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `route` command.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// The task description to classify and route.
    pub text: String,

    /// Print the decision as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_profile() {
        let cli = Cli::try_parse_from(["agentry", "install", "--profile", "backend"]).unwrap();
        if let Command::Install(args) = cli.command {
            assert_eq!(args.profile.as_deref(), Some("backend"));
            assert!(!args.global);
            assert!(!args.force);
            assert!(!args.dry_run);
        } else {
            panic!("Expected Install command");
        }
    }

    #[test]
    fn parse_install_full() {
        let cli = Cli::try_parse_from([
            "agentry",
            "install",
            "--category",
            "core",
            "--project",
            "/work/app",
            "--copy",
            "--force",
            "--dry-run",
        ])
        .unwrap();
        if let Command::Install(args) = cli.command {
            assert_eq!(args.category.as_deref(), Some("core"));
            assert_eq!(args.project.as_deref(), Some(std::path::Path::new("/work/app")));
            assert!(args.copy);
            assert!(!args.symlink);
            assert!(args.force);
            assert!(args.dry_run);
        } else {
            panic!("Expected Install command");
        }
    }

    #[test]
    fn install_requires_a_source() {
        assert!(Cli::try_parse_from(["agentry", "install"]).is_err());
    }

    #[test]
    fn install_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "agentry",
            "install",
            "--profile",
            "backend",
            "--category",
            "core",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn install_modes_are_exclusive() {
        let result = Cli::try_parse_from([
            "agentry",
            "install",
            "--profile",
            "backend",
            "--symlink",
            "--copy",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn scope_flags_are_exclusive() {
        let result = Cli::try_parse_from([
            "agentry",
            "install",
            "--profile",
            "backend",
            "--global",
            "--project",
            "/work/app",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_uninstall_all() {
        let cli = Cli::try_parse_from(["agentry", "uninstall", "--all", "--global"]).unwrap();
        if let Command::Uninstall(args) = cli.command {
            assert!(args.all);
            assert!(args.global);
        } else {
            panic!("Expected Uninstall command");
        }
    }

    #[test]
    fn parse_health_default_scope() {
        let cli = Cli::try_parse_from(["agentry", "health"]).unwrap();
        if let Command::Health(args) = cli.command {
            assert!(!args.global);
            assert!(args.project.is_none());
        } else {
            panic!("Expected Health command");
        }
    }

    #[test]
    fn parse_show_profile() {
        let cli = Cli::try_parse_from(["agentry", "show-profile", "backend"]).unwrap();
        if let Command::ShowProfile(args) = cli.command {
            assert_eq!(args.name, "backend");
        } else {
            panic!("Expected ShowProfile command");
        }
    }

    #[test]
    fn parse_route_with_json() {
        let cli =
            Cli::try_parse_from(["agentry", "route", "read config.json", "--json"]).unwrap();
        if let Command::Route(args) = cli.command {
            assert_eq!(args.text, "read config.json");
            assert!(args.json);
        } else {
            panic!("Expected Route command");
        }
    }

    #[test]
    fn parse_agents_with_category() {
        let cli = Cli::try_parse_from(["agentry", "agents", "--category", "core"]).unwrap();
        if let Command::Agents(args) = cli.command {
            assert_eq!(args.category.as_deref(), Some("core"));
        } else {
            panic!("Expected Agents command");
        }
    }
}
