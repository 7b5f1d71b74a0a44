//! Fake Quantization for Quantization-Aware Training (QAT)
//!
//! Fake quantization simulates the effects of quantization during training:
//! - Forward: quantize → dequantize (simulates quantization noise)
//! - Backward: Straight-Through Estimator (STE), zeroed outside `[-amax, amax]`
//!
//! A learnable [`clip`] in front of the quantizer lets training move amax.

mod clip;
mod ops;

#[cfg(test)]
mod tests;

pub use clip::clip;
pub use ops::{fake_quantize_value, fake_tensor_quant, AMAX_EPSILON};
