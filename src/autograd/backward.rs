//! Backward operation trait

use super::Tensor;

/// A node in the gradient tape
///
/// Implementations read the gradient of their result, accumulate into the
/// inputs that require grad, then recurse into the inputs' own ops.
pub trait BackwardOp {
    fn backward(&self);
}

/// Recurse into the ops that produced `inputs`
pub(crate) fn propagate(inputs: &[&Tensor]) {
    for input in inputs {
        if let Some(op) = input.backward_op() {
            op.backward();
        }
    }
}
