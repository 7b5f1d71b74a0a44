//! CLI command tests

use super::*;
use crate::cli::{Cli, Command, InspectArgs, SimulateArgs};
use crate::config::QuantSpec;
use std::path::PathBuf;
use tempfile::TempDir;

const SPEC_YAML: &str = r"
bits: 8
mode: qat
seed: 3
layers:
  - name: fc1
    in_features: 8
    out_features: 16
  - name: fc2
    in_features: 16
    out_features: 4
    pre_activation: relu
    quantize_output: true
  - name: head
    in_features: 4
    out_features: 2
    pre_activation: encoder_out
    quantize_weight: false
";

fn write_spec(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("quant.yaml");
    std::fs::write(&path, yaml).expect("write spec");
    path
}

fn cli(command: Command) -> Cli {
    Cli {
        command,
        verbose: false,
        quiet: true,
    }
}

#[test]
fn test_run_inspect() {
    let dir = TempDir::new().expect("temp dir");
    let spec = write_spec(&dir, SPEC_YAML);
    let result = run_command(cli(Command::Inspect(InspectArgs { spec })));
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn test_run_inspect_missing_file() {
    let result = run_command(cli(Command::Inspect(InspectArgs {
        spec: PathBuf::from("/nonexistent/quant.yaml"),
    })));
    let err = result.expect_err("missing file");
    assert!(err.contains("Failed to load spec"));
}

#[test]
fn test_run_simulate() {
    let dir = TempDir::new().expect("temp dir");
    let spec = write_spec(&dir, SPEC_YAML);
    let result = run_command(cli(Command::Simulate(SimulateArgs {
        spec,
        batches: 4,
        batch_size: 2,
        seed: Some(11),
    })));
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn test_simulate_int8_error_is_small() {
    let spec = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    let reports = simulate(&spec, 8, 4, 0).expect("simulate");
    assert_eq!(reports.len(), 3);
    for report in &reports {
        assert!(report.max_abs_error.is_finite());
        assert!(report.rmse <= report.max_abs_error + 1e-6);
    }
    // encoder_out without weight quantization leaves nothing to quantize
    assert_eq!(reports[2].max_abs_error, 0.0);
    assert!(reports[0].rmse < 0.1, "int8 rmse {}", reports[0].rmse);
}

#[test]
fn test_simulate_int4_error_exceeds_int8() {
    let int8 = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    let int4 = QuantSpec::from_yaml(&SPEC_YAML.replace("bits: 8", "bits: 4")).expect("valid spec");

    let e8 = simulate(&int8, 8, 4, 5).expect("simulate");
    let e4 = simulate(&int4, 8, 4, 5).expect("simulate");
    assert!(e4[0].rmse > e8[0].rmse);
}

#[test]
fn test_simulate_disabled_is_exact() {
    let spec = QuantSpec::from_yaml(&SPEC_YAML.replace("mode: qat", "mode: disabled"))
        .expect("valid spec");
    let reports = simulate(&spec, 2, 2, 0).expect("simulate");
    assert!(reports.iter().all(|r| r.max_abs_error == 0.0));
}

#[test]
fn test_simulate_is_seeded() {
    let spec = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    let a = simulate(&spec, 4, 2, 9).expect("simulate");
    let b = simulate(&spec, 4, 2, 9).expect("simulate");
    assert_eq!(a, b);
}

#[test]
fn test_simulate_rejects_zero_batches() {
    let spec = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    assert!(simulate(&spec, 0, 4, 0).is_err());
    assert!(simulate(&spec, 4, 0, 0).is_err());
}

#[test]
fn test_format_layer() {
    let spec = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    let layers = spec.build().expect("build");

    let (name, layer) = &layers[1];
    let text = inspect::format_layer(name, layer);
    assert!(text.starts_with("  fc2: QuantLinear(in_features=16"));
    assert!(text.contains("input: TensorQuantizer(input: 8bit unsigned narrow"));
    assert!(text.contains("output: TensorQuantizer(output: 8bit narrow amax=16.0000"));

    let (name, layer) = &layers[2];
    let text = inspect::format_layer(name, layer);
    assert!(text.contains("input: bypassed"));
    assert!(text.contains("weight: full precision"));
}

#[test]
fn test_format_spec_info() {
    let spec = QuantSpec::from_yaml(SPEC_YAML).expect("valid spec");
    let info = inspect::format_spec_info(&spec);
    assert!(info.contains("Bits: 8"));
    assert!(info.contains("Mode: qat"));
    assert!(info.contains("Layers: 3"));
}
