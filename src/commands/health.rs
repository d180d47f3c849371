//! Implementation of the `agentry health` command.

use crate::cli::ScopeArgs;
use crate::deploy::DeploymentTarget;
use crate::error::Result;
use crate::exit_codes;
use crate::health;

use super::{load_app_context, resolve_scope};

/// Execute the `agentry health` command.
///
/// Prints a per-entry status table. Exit code 0 when every tracked entry is
/// ok, 1 otherwise. Foreign files are reported but do not affect the exit
/// code.
pub fn cmd_health(args: ScopeArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let scope = resolve_scope(args.global, args.project)?;
    let target = DeploymentTarget::new(scope, ctx.config.default_mode);
    let root = target.root()?;

    let report = health::check(&target)?;

    println!("Deployment health: {}", root.display());
    println!();

    if report.entries.is_empty() {
        println!("  (no tracked entries)");
    }
    for entry in &report.entries {
        println!("  {:12} {}", entry.status, entry.agent_id);
    }

    if !report.foreign.is_empty() {
        println!();
        println!("Foreign files (untracked, never modified):");
        for path in &report.foreign {
            println!("  - {}", path.display());
        }
    }

    println!();
    if report.all_ok() {
        println!("All tracked entries ok.");
        Ok(exit_codes::SUCCESS)
    } else {
        println!(
            "{} entr(ies) need repair; run `agentry repair`.",
            report.non_ok().len()
        );
        Ok(exit_codes::OPERATION_FAILURE)
    }
}
