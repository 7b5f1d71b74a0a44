//! entrenar-qat CLI
//!
//! # Usage
//!
//! ```bash
//! # Print each layer and its quantizers
//! entrenar-qat inspect quant.yaml
//!
//! # Calibrate on random inputs and report quantization error
//! entrenar-qat simulate quant.yaml --batches 16 --batch-size 8 --seed 42
//! ```

use clap::Parser;
use entrenar_qat::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
