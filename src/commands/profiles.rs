//! Implementation of the `agentry profiles` and `show-profile` commands.

use crate::cli::ShowProfileArgs;
use crate::error::Result;
use crate::exit_codes;
use crate::profile::{self, ProfileSource};

use super::load_app_context;

/// Execute the `agentry profiles` command.
///
/// Read-only listing of the hub's profiles; always exits 0.
pub fn cmd_profiles() -> Result<i32> {
    let ctx = load_app_context()?;

    let profiles = profile::list_profiles(&ctx.hub)?;

    if profiles.is_empty() {
        println!("No profiles in {}", ctx.hub.profiles_dir.display());
        return Ok(exit_codes::SUCCESS);
    }

    println!("Profiles in {}:", ctx.hub.profiles_dir.display());
    println!();
    for profile in &profiles {
        println!(
            "  {:20} {} ({} agent(s))",
            profile.name,
            profile.description,
            profile.agent_ids().len()
        );
    }

    Ok(exit_codes::SUCCESS)
}

/// Execute the `agentry show-profile` command.
///
/// Exits 2 when the profile name is unknown (resolution failure).
pub fn cmd_show_profile(args: ShowProfileArgs) -> Result<i32> {
    let ctx = load_app_context()?;

    let source = ProfileSource::Named(args.name);
    let profile = profile::load_profile(&source, &ctx.hub, &ctx.registry)?;

    println!("Profile: {}", profile.name);
    if !profile.description.is_empty() {
        println!("Description: {}", profile.description);
    }
    println!();
    println!("Agents:");
    for id in profile.agent_ids() {
        if ctx.registry.contains(id) {
            println!("  - {}", id);
        } else {
            println!("  - {}  (not in registry)", id);
        }
    }

    Ok(exit_codes::SUCCESS)
}
