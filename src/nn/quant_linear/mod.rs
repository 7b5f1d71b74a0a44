//! Quantization-aware linear layer
//!
//! One layer type covers both bit widths: [`QuantProfile`](crate::quant::QuantProfile)
//! picks the 4-bit or 8-bit descriptor presets for each role.

mod config;
mod layer;


pub use config::{PreActivation, QuantLinearConfig};
pub use layer::QuantLinear;
