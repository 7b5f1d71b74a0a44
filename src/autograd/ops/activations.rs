//! Activation ops

use crate::autograd::{propagate, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// ReLU activation
///
/// Typically placed in front of a layer built with `PreActivation::Relu`,
/// whose input quantizer then uses the unsigned range.
pub fn relu(a: &Tensor) -> Tensor {
    let mut result = Tensor::shaped_like(a.data().mapv(|x| x.max(0.0)), a, a.requires_grad());

    if a.requires_grad() {
        // Subgradient 0 at x == 0
        let active = a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
        result.set_backward_op(Rc::new(ReluBackward {
            input: a.clone(),
            active,
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct ReluBackward {
    input: Tensor,
    active: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        let Some(grad) = self.result_grad.borrow().as_ref().map(|g| g * &self.active) else {
            return;
        };
        self.input.accumulate_grad(grad);
        propagate(&[&self.input]);
    }
}
