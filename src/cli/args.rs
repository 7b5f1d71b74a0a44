//! CLI argument types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quantization-aware linear layers: inspect and simulate quantization specs
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "entrenar-qat")]
#[command(version)]
#[command(about = "Inspect and simulate 4-bit / 8-bit quantization-aware linear layers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every layer of a spec with its quantizers
    Inspect(InspectArgs),

    /// Calibrate on random inputs and report quantization error
    Simulate(SimulateArgs),
}

/// Arguments for the inspect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectArgs {
    /// Path to the YAML quantization spec
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,
}

/// Arguments for the simulate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SimulateArgs {
    /// Path to the YAML quantization spec
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,

    /// Number of calibration batches per layer
    #[arg(long, default_value_t = 8)]
    pub batches: usize,

    /// Rows per batch
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Seed for the random inputs (defaults to the spec's seed)
    #[arg(long)]
    pub seed: Option<u64>,
}
