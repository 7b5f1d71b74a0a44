//! Per-tensor fake quantization op with clipped STE backward

use crate::autograd::{propagate, BackwardOp, GradCell, Tensor};
use crate::error::{QuantError, Result};
use crate::quant::descriptor::quant_bounds;
use std::rc::Rc;

/// Amax at or below this quantizes everything to zero
pub const AMAX_EPSILON: f32 = 1.0 / (1u32 << 24) as f32;

/// Fake quantize a single value: `clamp(round(x * scale), min, max) / scale`
///
/// Rounds half to even.
#[inline]
pub fn fake_quantize_value(x: f32, scale: f32, min_bound: f32, max_bound: f32) -> f32 {
    (x * scale).round_ties_even().clamp(min_bound, max_bound) / scale
}

/// Fake quantize a tensor with a per-tensor amax
///
/// `scale = max_bound / amax`. Unsigned quantization rejects negative inputs.
/// The backward pass lets the gradient through where `|x| <= amax` and
/// zeroes it elsewhere.
pub fn fake_tensor_quant(
    input: &Tensor,
    amax: f32,
    num_bits: u32,
    unsigned: bool,
    narrow_range: bool,
) -> Result<Tensor> {
    if !amax.is_finite() || amax < 0.0 {
        return Err(QuantError::InvalidAmax(amax));
    }
    if !(2..=16).contains(&num_bits) {
        return Err(QuantError::InvalidNumBits(num_bits));
    }
    if unsigned {
        let min = input.data().iter().copied().fold(f32::INFINITY, f32::min);
        if min < 0.0 {
            return Err(QuantError::NegativeUnsigned(min));
        }
    }

    let (min_bound, max_bound) = quant_bounds(num_bits, unsigned, narrow_range);
    let data = if amax <= AMAX_EPSILON {
        input.data().mapv(|_| 0.0)
    } else {
        let scale = max_bound / amax;
        input
            .data()
            .mapv(|x| fake_quantize_value(x, scale, min_bound, max_bound))
    };

    let requires_grad = input.requires_grad();
    let mut result = Tensor::shaped_like(data, input, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(FakeQuantBackward {
            input: input.clone(),
            amax,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    Ok(result)
}

struct FakeQuantBackward {
    input: Tensor,
    amax: f32,
    result_grad: GradCell,
}

impl BackwardOp for FakeQuantBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.input.requires_grad() {
                let mut grad_input = grad.clone();
                for (g, &x) in grad_input.iter_mut().zip(self.input.data().iter()) {
                    if x.abs() > self.amax {
                        *g = 0.0;
                    }
                }
                self.input.accumulate_grad(grad_input);
            }

            propagate(&[&self.input]);
        }
    }
}
