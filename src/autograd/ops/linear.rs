//! Affine transform autograd operations: linear and bias broadcast

use crate::autograd::{propagate, BackwardOp, GradCell, Tensor};
use ndarray::{Array1, Array2, ArrayView2};
use std::rc::Rc;

/// View a flat row-major buffer as a `rows × cols` matrix
fn as_matrix(data: &Array1<f32>, rows: usize, cols: usize) -> ArrayView2<'_, f32> {
    match data.view().into_shape_with_order((rows, cols)) {
        Ok(view) => view,
        Err(e) => panic!("cannot view {} elements as {rows}x{cols}: {e}", data.len()),
    }
}

/// Row-major flatten, independent of the product's memory order
fn flatten(matrix: Array2<f32>) -> Array1<f32> {
    matrix.iter().copied().collect()
}

/// Linear transform without bias: `y = x @ Wᵗ`
///
/// - `input` has shape `[..., in_features]`
/// - `weight` is `out_features × in_features` (flattened, row-major)
/// - result has shape `[..., out_features]`
pub fn linear(input: &Tensor, weight: &Tensor, in_features: usize, out_features: usize) -> Tensor {
    assert_eq!(weight.len(), out_features * in_features, "Weight size mismatch");
    assert!(
        in_features > 0 && input.len() % in_features == 0,
        "Input size {} is not a multiple of in_features {}",
        input.len(),
        in_features
    );
    let rows = input.len() / in_features;

    let x = as_matrix(input.data(), rows, in_features);
    let w = as_matrix(weight.data(), out_features, in_features);
    let out = flatten(x.dot(&w.t()));

    let mut shape: Vec<usize> = match input.shape().split_last() {
        Some((_, batch)) => batch.to_vec(),
        None => Vec::new(),
    };
    shape.push(out_features);

    let requires_grad = input.requires_grad() || weight.requires_grad();
    let mut result = Tensor::new(out, requires_grad).with_shape_unchecked(shape);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            input: input.clone(),
            weight: weight.clone(),
            rows,
            in_features,
            out_features,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct LinearBackward {
    input: Tensor,
    weight: Tensor,
    rows: usize,
    in_features: usize,
    out_features: usize,
    result_grad: GradCell,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let grad_y = as_matrix(grad_output, self.rows, self.out_features);

            if self.input.requires_grad() {
                // ∂L/∂x = ∂L/∂y @ W  (rows×out) @ (out×in)
                let w = as_matrix(self.weight.data(), self.out_features, self.in_features);
                self.input.accumulate_grad(flatten(grad_y.dot(&w)));
            }

            if self.weight.requires_grad() {
                // ∂L/∂W = (∂L/∂y)ᵗ @ x  (out×rows) @ (rows×in)
                let x = as_matrix(self.input.data(), self.rows, self.in_features);
                self.weight.accumulate_grad(flatten(grad_y.t().dot(&x)));
            }

            propagate(&[&self.input, &self.weight]);
        }
    }
}

/// Add a bias vector to every row: `y[..., j] = x[..., j] + b[j]`
pub fn add_bias(input: &Tensor, bias: &Tensor) -> Tensor {
    let features = bias.len();
    assert!(
        features > 0 && input.len() % features == 0,
        "Input size {} is not a multiple of bias size {}",
        input.len(),
        features
    );

    let mut data = input.data().clone();
    for (i, val) in data.iter_mut().enumerate() {
        *val += bias.data()[i % features];
    }

    let requires_grad = input.requires_grad() || bias.requires_grad();
    let mut result = Tensor::shaped_like(data, input, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            input: input.clone(),
            bias: bias.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    input: Tensor,
    bias: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.input.requires_grad() {
                self.input.accumulate_grad(grad.clone());
            }

            if self.bias.requires_grad() {
                // ∂L/∂b = column sums of ∂L/∂y
                let features = self.bias.len();
                let mut grad_b = Array1::zeros(features);
                for (i, &g) in grad.iter().enumerate() {
                    grad_b[i % features] += g;
                }
                self.bias.accumulate_grad(grad_b);
            }

            propagate(&[&self.input, &self.bias]);
        }
    }
}
