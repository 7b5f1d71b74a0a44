//! CLI module for entrenar-qat
//!
//! This module contains the argument types and command handlers.

mod args;
mod commands;
mod logging;

pub use args::{Cli, Command, InspectArgs, SimulateArgs};
pub use commands::{run_command, simulate, SimulationReport};
pub use logging::{init_tracing, LogLevel};
