//! PTQ (Post-Training Quantization) Calibration
//!
//! Calibrators observe the tensors flowing through a quantizer and derive the
//! clipping threshold (amax) from them:
//! - Max: largest absolute value observed
//! - Percentile: histogram of absolute values, robust to outliers

mod calibrator;
mod histogram;
mod types;


pub use calibrator::{calibrate_max, calibrate_percentile, Calibrator, MaxCalibrator};
pub use histogram::HistogramCalibrator;
pub use types::{CalibMethod, DEFAULT_NUM_BINS};
