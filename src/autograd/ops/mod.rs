//! Autograd operations with backward passes

mod activations;
mod basic;
mod linear;

pub use activations::relu;
pub use basic::{add, mul, scale, sum};
pub use linear::{add_bias, linear};
