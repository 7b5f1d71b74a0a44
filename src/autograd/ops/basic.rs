//! Element-wise arithmetic and the sum reduction

use crate::autograd::{propagate, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Element-wise op recorded on the tape
#[derive(Clone, Copy, Debug)]
enum Elementwise {
    Add,
    Mul,
    Scale(f32),
}

/// Add two tensors of the same size
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: tensor sizes differ");
    record(Elementwise::Add, a, Some(b), a.data() + b.data())
}

/// Multiply two tensors of the same size
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "mul: tensor sizes differ");
    record(Elementwise::Mul, a, Some(b), a.data() * b.data())
}

/// Multiply every element by `factor`
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    record(Elementwise::Scale(factor), a, None, a.data() * factor)
}

fn record(op: Elementwise, lhs: &Tensor, rhs: Option<&Tensor>, data: Array1<f32>) -> Tensor {
    let requires_grad = lhs.requires_grad() || rhs.is_some_and(Tensor::requires_grad);
    let mut result = Tensor::shaped_like(data, lhs, requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(ElementwiseBackward {
            op,
            lhs: lhs.clone(),
            rhs: rhs.cloned(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct ElementwiseBackward {
    op: Elementwise,
    lhs: Tensor,
    rhs: Option<Tensor>,
    result_grad: GradCell,
}

impl ElementwiseBackward {
    /// Gradient flowing into `lhs`, given the gradient of the result
    fn lhs_grad(&self, grad: &Array1<f32>) -> Array1<f32> {
        match (self.op, &self.rhs) {
            (Elementwise::Mul, Some(rhs)) => grad * rhs.data(),
            (Elementwise::Scale(factor), _) => grad * factor,
            _ => grad.clone(),
        }
    }

    fn rhs_grad(&self, grad: &Array1<f32>) -> Array1<f32> {
        match self.op {
            Elementwise::Mul => grad * self.lhs.data(),
            _ => grad.clone(),
        }
    }
}

impl BackwardOp for ElementwiseBackward {
    fn backward(&self) {
        let Some(grad) = self.result_grad.borrow().clone() else {
            return;
        };

        if self.lhs.requires_grad() {
            self.lhs.accumulate_grad(self.lhs_grad(&grad));
        }
        match &self.rhs {
            Some(rhs) => {
                if rhs.requires_grad() {
                    rhs.accumulate_grad(self.rhs_grad(&grad));
                }
                propagate(&[&self.lhs, rhs]);
            }
            None => propagate(&[&self.lhs]),
        }
    }
}

/// Sum every element into a one-element tensor
pub fn sum(a: &Tensor) -> Tensor {
    let requires_grad = a.requires_grad();
    let mut result = Tensor::scalar(a.data().sum(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(SumBackward {
            input: a.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct SumBackward {
    input: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        let Some(grad) = self.result_grad.borrow().as_ref().map(|g| g[0]) else {
            return;
        };
        if self.input.requires_grad() {
            self.input
                .accumulate_grad(Array1::from_elem(self.input.len(), grad));
        }
        propagate(&[&self.input]);
    }
}
