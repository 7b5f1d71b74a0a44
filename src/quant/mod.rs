//! Quantization: descriptors, fake quantization, calibration and quantizers
//!
//! Provides the pieces quantization-aware layers are assembled from:
//! - Per-tensor descriptors and the 4-bit / 8-bit role presets
//! - Fake quantization with STE and a learnable clip for QAT
//! - PTQ calibration (max, histogram percentile)
//! - Stateful tensor quantizers with PTQ / QAT mode switching

mod calibration;
mod descriptor;
mod fake_quantize;
mod presets;
mod tensor_quantizer;

pub use calibration::{
    calibrate_max, calibrate_percentile, CalibMethod, Calibrator, HistogramCalibrator,
    MaxCalibrator, DEFAULT_NUM_BINS,
};
pub use descriptor::{quant_bounds, QuantDescriptor};
pub use fake_quantize::{clip, fake_quantize_value, fake_tensor_quant, AMAX_EPSILON};
pub use presets::{
    QuantPresets, QuantProfile, ACT_QUANT_4BIT, ACT_QUANT_8BIT, INT4_PRESETS, INT8_PRESETS,
    OUT_QUANT_4BIT, OUT_QUANT_8BIT, RELU_QUANT_4BIT, RELU_QUANT_8BIT, WEIGHT_QUANT_4BIT,
    WEIGHT_QUANT_8BIT,
};
pub use tensor_quantizer::{
    disable_quant, enable_quant, load_calib_amax, ptq_mode, qat_mode, set_mode, LearnedRange,
    QuantMode, QuantModule, QuantRole, TensorQuantizer,
};
