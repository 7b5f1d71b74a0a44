//! Declarative quantization specs
//!
//! A YAML [`QuantSpec`] names a bit width, a quantization mode, a calibration
//! method and a list of layers, and builds the corresponding
//! [`QuantLinear`](crate::nn::QuantLinear)s.

mod schema;
mod validate;


pub use schema::{LayerSpec, QuantSpec};
pub use validate::validate_spec;
