//! Learnable clip used for learned amax

use crate::autograd::{propagate, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Clamp `input` to `[min, max]`, where both bounds are single-element tensors
///
/// Gradients:
/// - input: passes where `min <= x <= max`
/// - min: sum of the output gradient where `x < min`
/// - max: sum of the output gradient where `x > max`
pub fn clip(input: &Tensor, min: &Tensor, max: &Tensor) -> Tensor {
    assert_eq!(min.len(), 1, "clip min must be a single value");
    assert_eq!(max.len(), 1, "clip max must be a single value");

    let lo = min.data()[0];
    let hi = max.data()[0];
    let data = input.data().mapv(|x| x.max(lo).min(hi));

    let requires_grad = input.requires_grad() || min.requires_grad() || max.requires_grad();
    let mut result = Tensor::shaped_like(data, input, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ClipBackward {
            input: input.clone(),
            min: min.clone(),
            max: max.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ClipBackward {
    input: Tensor,
    min: Tensor,
    max: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for ClipBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let lo = self.min.data()[0];
            let hi = self.max.data()[0];

            let mut grad_input = Array1::zeros(grad.len());
            let mut grad_min = 0.0;
            let mut grad_max = 0.0;
            for ((gi, &g), &x) in grad_input.iter_mut().zip(grad.iter()).zip(self.input.data()) {
                if x < lo {
                    grad_min += g;
                } else if x > hi {
                    grad_max += g;
                } else {
                    *gi = g;
                }
            }

            if self.input.requires_grad() {
                self.input.accumulate_grad(grad_input);
            }
            if self.min.requires_grad() {
                self.min.accumulate_grad(Array1::from(vec![grad_min]));
            }
            if self.max.requires_grad() {
                self.max.accumulate_grad(Array1::from(vec![grad_max]));
            }

            propagate(&[&self.input]);
        }
    }
}
