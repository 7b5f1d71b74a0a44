//! Neural network layers
//!
//! - [`Linear`]: dense affine layer over the tape autograd
//! - [`QuantLinear`]: `Linear` wrapped with input, weight and output fake quantizers

mod linear;
mod quant_linear;

pub use linear::Linear;
pub use quant_linear::{PreActivation, QuantLinear, QuantLinearConfig};
