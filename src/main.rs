//! Agentry: deployment resolver and routing classifier for agent registries.
//!
//! This is the main entry point for the `agentry` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod health;
pub mod hub;
pub mod locks;
pub mod profile;
pub mod records;
pub mod registry;
pub mod routing;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
