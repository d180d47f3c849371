//! Implementation of the `agentry route` command.

use crate::cli::RouteArgs;
use crate::error::{AgentryError, Result};
use crate::exit_codes;
use crate::routing;
use serde_json::json;

use super::load_app_context;

/// Execute the `agentry route` command.
///
/// Prints the decision (tier, target, rationale) and exits 0. With `--json`
/// the decision goes to stdout as a single JSON document; diagnostics never
/// share that channel.
pub fn cmd_route(args: RouteArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let (score, decision) = routing::route(&args.text, &ctx.registry);

    if args.json {
        let doc = json!({
            "tier": decision.tier,
            "target": decision.target,
            "rationale": decision.rationale,
            "score": score,
        });
        let rendered = serde_json::to_string_pretty(&doc).map_err(|e| {
            AgentryError::Validation(format!("failed to serialize routing decision: {}", e))
        })?;
        println!("{}", rendered);
        return Ok(exit_codes::SUCCESS);
    }

    println!("Tier:   {}", decision.tier);
    println!("Target: {}", decision.target);
    println!(
        "Score:  {:.3} ({} specialist domain(s))",
        score.raw_score, score.domain_count
    );
    println!("Rationale:");
    for reason in &decision.rationale {
        println!("  - {}", reason);
    }

    Ok(exit_codes::SUCCESS)
}
