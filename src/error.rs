//! Error types for quantized layers and their configuration

use thiserror::Error;

/// Errors raised by quantizers, layers and quantization specs
#[derive(Debug, Error)]
pub enum QuantError {
    #[error("Invalid quantization bits: {0} (must be in 2..=16)")]
    InvalidNumBits(u32),

    #[error("Invalid amax: {0} (must be finite and >= 0.0)")]
    InvalidAmax(f32),

    #[error("learn_amax requires an initial amax")]
    MissingAmax,

    #[error("Negative values encountered in unsigned quantization (min = {0})")]
    NegativeUnsigned(f32),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Calibrator for {0} quantizer has no data; run a calibration pass first")]
    CalibrationRequired(String),

    #[error("Invalid percentile: {0} (must be in (0.0, 100.0])")]
    InvalidPercentile(f32),

    #[error("Unknown pre-activation: {0} (must be one of: none, relu, encoder_out)")]
    UnknownPreActivation(String),

    #[error("Invalid layer dimension: {name} must be > 0")]
    InvalidDimension { name: &'static str },

    #[error("Invalid quantization bits: {0} (must be 4 or 8)")]
    InvalidQuantBits(u8),

    #[error("Invalid quantization spec: {0}")]
    InvalidSpec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for quantization operations
pub type Result<T> = std::result::Result<T, QuantError>;
