//! Simulate command implementation
//!
//! Builds every layer of a spec, calibrates it on seeded random inputs, switches
//! to QAT mode and measures how far the quantized output drifts from the
//! full-precision one.

use crate::cli::logging::log;
use crate::cli::{LogLevel, SimulateArgs};
use crate::config::QuantSpec;
use crate::error::QuantError;
use crate::nn::{PreActivation, QuantLinear};
use crate::quant::{load_calib_amax, ptq_mode, qat_mode, QuantMode};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Input range for the random batches
const INPUT_RANGE: f32 = 2.0;

/// Quantization error of one layer
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationReport {
    pub name: String,
    pub max_abs_error: f32,
    pub rmse: f32,
}

/// Calibrate and evaluate every layer of `spec`
///
/// With `QuantMode::Disabled` no calibration runs and the layers pass through.
pub fn simulate(
    spec: &QuantSpec,
    batches: usize,
    batch_size: usize,
    seed: u64,
) -> crate::error::Result<Vec<SimulationReport>> {
    if batches == 0 || batch_size == 0 {
        return Err(QuantError::InvalidSpec(
            "batches and batch size must be > 0".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut reports = Vec::with_capacity(spec.layers.len());

    for (name, mut layer) in spec.build()? {
        if spec.mode != QuantMode::Disabled {
            ptq_mode(&mut layer);
            for _ in 0..batches {
                let x = random_batch(&mut rng, &layer, batch_size)?;
                layer.forward(&x)?;
            }
            load_calib_amax(&mut layer)?;
            qat_mode(&mut layer);
            debug!(layer = %name, batches, "calibrated layer");
        }

        let x = random_batch(&mut rng, &layer, batch_size)?;
        let quantized = layer.forward(&x)?;
        let reference = layer.linear().forward(&x)?;
        let report = compare(name, &quantized, &reference);
        info!(
            layer = %report.name,
            max_abs_error = report.max_abs_error,
            rmse = report.rmse,
            "simulated layer"
        );
        reports.push(report);
    }

    Ok(reports)
}

/// Uniform inputs in `±INPUT_RANGE`, rectified for layers that follow a ReLU
fn random_batch(
    rng: &mut StdRng,
    layer: &QuantLinear,
    batch_size: usize,
) -> crate::error::Result<Tensor> {
    let config = layer.config();
    let relu = config.pre_activation == PreActivation::Relu;
    let data: Vec<f32> = (0..batch_size * config.in_features)
        .map(|_| {
            let x = rng.random_range(-INPUT_RANGE..INPUT_RANGE);
            if relu {
                x.max(0.0)
            } else {
                x
            }
        })
        .collect();
    Tensor::from_shape_vec(&[batch_size, config.in_features], data, false)
}

fn compare(name: String, quantized: &Tensor, reference: &Tensor) -> SimulationReport {
    let (max_abs_error, sum_sq) = quantized
        .data()
        .iter()
        .zip(reference.data())
        .fold((0.0f32, 0.0f64), |(max, sum), (&a, &b)| {
            let diff = (a - b).abs();
            (max.max(diff), sum + f64::from(diff) * f64::from(diff))
        });
    let rmse = (sum_sq / reference.len().max(1) as f64).sqrt() as f32;
    SimulationReport {
        name,
        max_abs_error,
        rmse,
    }
}

pub fn run_simulate(args: SimulateArgs, level: LogLevel) -> Result<(), String> {
    let spec = QuantSpec::load(&args.spec).map_err(|e| {
        format!("Failed to load spec {}: {e}", args.spec.display())
    })?;
    let seed = args.seed.unwrap_or(spec.seed);

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Simulating {} layer(s): int{} {} mode, {} calibration",
            spec.layers.len(),
            spec.bits,
            spec.mode,
            spec.calibration
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  batches={} batch_size={} seed={seed}",
            args.batches, args.batch_size
        ),
    );

    let reports = simulate(&spec, args.batches, args.batch_size, seed)
        .map_err(|e| format!("Simulation failed: {e}"))?;

    for report in &reports {
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  {}: max_abs_error={:.6} rmse={:.6}",
                report.name, report.max_abs_error, report.rmse
            ),
        );
    }

    Ok(())
}
