//! Implementation of the `agentry uninstall` command.

use crate::cli::UninstallArgs;
use crate::deploy::{self, DeploymentTarget, OverallStatus};
use crate::error::Result;
use crate::exit_codes;
use crate::profile;

use super::{load_app_context, profile_source, resolve_scope};

/// Execute the `agentry uninstall` command.
///
/// `--all` removes every tracked entry; the other sources resolve a profile
/// and remove its agents. Exit code 0 on full success, 1 when any removal
/// failed.
pub fn cmd_uninstall(args: UninstallArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let ids = if args.all {
        None
    } else {
        let source = profile_source(args.profile, args.category, args.profile_file)?;
        let set = profile::resolve(&source, &ctx.hub, &ctx.registry)?;
        Some(set.ordered_ids().to_vec())
    };

    let scope = resolve_scope(args.global, args.project)?;
    // Mode is irrelevant for removal; records decide what exists.
    let target = DeploymentTarget::new(scope, ctx.config.default_mode);
    let root = target.root()?;

    let report = deploy::uninstall(&target, ids.as_deref(), &ctx.config)?;

    println!("Uninstalling from {}", root.display());
    println!();

    for id in &report.removed {
        println!("  removed    {}", id);
    }
    for id in &report.untracked {
        println!("  untracked  {}  (no record; left alone)", id);
    }
    for entry in &report.failed {
        println!(
            "  failed     {}  ({})",
            entry.agent_id,
            entry.message.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    println!(
        "Result: {} ({} removed, {} untracked, {} failed)",
        report.overall(),
        report.removed.len(),
        report.untracked.len(),
        report.failed.len(),
    );

    Ok(match report.overall() {
        OverallStatus::Success => exit_codes::SUCCESS,
        _ => exit_codes::OPERATION_FAILURE,
    })
}
