//! Implementation of the `agentry install` command.

use crate::cli::InstallArgs;
use crate::deploy::{self, DeployMode, DeploymentTarget, EntryStatus, InstallOptions, OverallStatus};
use crate::error::Result;
use crate::exit_codes;
use crate::profile;

use super::{load_app_context, profile_source, resolve_scope};

/// Execute the `agentry install` command.
///
/// Exit code 0 on full success, 1 when any entry failed or was skipped.
/// Resolution failures (unknown profile or agent) propagate as errors.
pub fn cmd_install(args: InstallArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let source = profile_source(args.profile, args.category, args.profile_file)?;
    let set = profile::resolve(&source, &ctx.hub, &ctx.registry)?;

    let mode = if args.copy {
        DeployMode::Copy
    } else if args.symlink {
        DeployMode::Symlink
    } else {
        ctx.config.default_mode
    };

    let scope = resolve_scope(args.global, args.project)?;
    let target = DeploymentTarget::new(scope, mode);
    let root = target.root()?;

    let options = InstallOptions {
        force: args.force,
        dry_run: args.dry_run,
        ..Default::default()
    };

    let report = deploy::install(&ctx.registry, set.ordered_ids(), &target, &ctx.config, &options)?;

    if report.dry_run {
        println!("Dry run: no filesystem changes were made");
    }
    println!(
        "Installing {} agent(s) into {} ({} mode)",
        set.len(),
        root.display(),
        mode
    );
    println!();

    for entry in &report.entries {
        match &entry.message {
            Some(message) => println!("  {:17} {}  ({})", entry.status, entry.agent_id, message),
            None => println!("  {:17} {}", entry.status, entry.agent_id),
        }
    }

    if report.cancelled {
        println!();
        println!("Cancelled before all agents were processed.");
    }

    println!();
    println!(
        "Result: {} ({} created, {} updated, {} unchanged, {} skipped, {} failed)",
        report.overall(),
        report.count(EntryStatus::Created),
        report.count(EntryStatus::Updated),
        report.count(EntryStatus::Unchanged),
        report.count(EntryStatus::SkippedConflict),
        report.count(EntryStatus::Failed),
    );

    Ok(match report.overall() {
        OverallStatus::Success => exit_codes::SUCCESS,
        _ => exit_codes::OPERATION_FAILURE,
    })
}
