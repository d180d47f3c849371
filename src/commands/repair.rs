//! Implementation of the `agentry repair` command.

use crate::cli::ScopeArgs;
use crate::deploy::DeploymentTarget;
use crate::error::Result;
use crate::exit_codes;
use crate::health;

use super::{load_app_context, resolve_scope};

/// Execute the `agentry repair` command.
///
/// Reinstalls every non-ok tracked entry with its recorded mode. Exit code
/// 0 when the target is fully healthy afterwards, 1 when any entry remains
/// non-ok.
pub fn cmd_repair(args: ScopeArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let scope = resolve_scope(args.global, args.project)?;
    let target = DeploymentTarget::new(scope, ctx.config.default_mode);
    let root = target.root()?;

    let report = health::repair(&target, &ctx.registry, &ctx.config)?;

    println!("Repairing {}", root.display());
    println!();

    if report.repaired.is_empty() && report.failed.is_empty() {
        println!("  nothing to repair");
    }
    for id in &report.repaired {
        println!("  repaired   {}", id);
    }
    for entry in &report.failed {
        println!(
            "  failed     {}  ({})",
            entry.agent_id,
            entry.message.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    if report.all_repaired() {
        println!("Repair complete: {} entr(ies) modified.", report.modified_count());
        Ok(exit_codes::SUCCESS)
    } else {
        println!(
            "Repair incomplete: {} entr(ies) still need attention.",
            report.failed.len()
        );
        Ok(exit_codes::OPERATION_FAILURE)
    }
}
