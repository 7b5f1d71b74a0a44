//! Tape-based autograd engine
//!
//! Every op records a [`BackwardOp`] on the tensor it returns. [`backward`] on
//! a loss seeds its gradient and recurses through those ops to the leaves, so
//! the layers here train without a separate graph structure.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub(crate) use backward::propagate;
pub use ops::*;
pub use tensor::{GradCell, Tensor};

use ndarray::Array1;

/// Seed `tensor`'s gradient and run the tape back to the leaves
///
/// Without `grad_output` the seed is all ones, the gradient of a scalar loss.
pub fn backward(tensor: &mut Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    tensor.set_grad(seed);
    propagate(&[&*tensor]);
}
