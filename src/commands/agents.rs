//! Implementation of the `agentry agents` command.

use crate::cli::AgentsArgs;
use crate::error::Result;
use crate::exit_codes;
use crate::registry::Category;

use super::{load_app_context, parse_category};

/// Execute the `agentry agents` command.
///
/// Lists registry contents grouped by category. Read-only; always exits 0.
pub fn cmd_agents(args: AgentsArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let filter = args.category.as_deref().map(parse_category).transpose()?;

    let categories: Vec<Category> = match filter {
        Some(category) => vec![category],
        None => vec![Category::Core, Category::Development, Category::Specialists],
    };

    for category in categories {
        let agents = ctx.registry.list(Some(category));

        println!("{} ({} agent(s)):", category, agents.len());
        for agent in agents {
            if agent.description.is_empty() {
                println!("  {}", agent.id);
            } else {
                println!("  {:24} {}", agent.id, agent.description);
            }
        }
        println!();
    }

    if !ctx.registry.skipped_files().is_empty() {
        eprintln!(
            "Warning: {} agent file(s) were skipped during load; see earlier warnings",
            ctx.registry.skipped_files().len()
        );
    }

    Ok(exit_codes::SUCCESS)
}
