//! CLI command implementations

mod inspect;
mod simulate;

#[cfg(test)]
mod tests;

use crate::cli::{Cli, Command, LogLevel};

pub use simulate::{simulate, SimulationReport};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Inspect(args) => inspect::run_inspect(args, log_level),
        Command::Simulate(args) => simulate::run_simulate(args, log_level),
    }
}
