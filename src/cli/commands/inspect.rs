//! Inspect command implementation

use crate::cli::logging::log;
use crate::cli::{InspectArgs, LogLevel};
use crate::config::QuantSpec;
use crate::nn::QuantLinear;
use crate::quant::TensorQuantizer;

/// Format one layer and its quantizers
pub fn format_layer(name: &str, layer: &QuantLinear) -> String {
    let slot = |label: &str, q: Option<&TensorQuantizer>, absent: &str| match q {
        Some(q) => format!("    {label}: {q}"),
        None => format!("    {label}: {absent}"),
    };

    [
        format!("  {name}: {layer}"),
        slot("input", layer.input_quantizer(), "bypassed"),
        slot("weight", layer.weight_quantizer(), "full precision"),
        slot("output", layer.output_quantizer(), "full precision"),
    ]
    .join("\n")
}

/// Format spec-wide settings
pub fn format_spec_info(spec: &QuantSpec) -> String {
    [
        format!("  Bits: {}", spec.bits),
        format!("  Mode: {}", spec.mode),
        format!("  Calibration: {}", spec.calibration),
        format!("  Seed: {}", spec.seed),
        format!("  Layers: {}", spec.layers.len()),
    ]
    .join("\n")
}

pub fn run_inspect(args: InspectArgs, level: LogLevel) -> Result<(), String> {
    let spec = QuantSpec::load(&args.spec).map_err(|e| {
        format!("Failed to load spec {}: {e}", args.spec.display())
    })?;
    let layers = spec.build().map_err(|e| format!("Failed to build layers: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Quantization spec: {}", args.spec.display()),
    );
    log(level, LogLevel::Normal, &format_spec_info(&spec));
    log(level, LogLevel::Normal, "");

    for (name, layer) in &layers {
        log(level, LogLevel::Normal, &format_layer(name, layer));
        let params: usize = layer.parameters().iter().map(|t| t.len()).sum();
        log(
            level,
            LogLevel::Verbose,
            &format!("    parameters: {params}"),
        );
    }

    Ok(())
}
