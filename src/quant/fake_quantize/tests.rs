//! Tests for fake quantization and learned clip

use super::*;
use crate::autograd::backward;
use crate::error::QuantError;
use crate::quant::descriptor::quant_bounds;
use crate::Tensor;
use approx::assert_abs_diff_eq;
use ndarray::Array1;
use proptest::prelude::*;

// ========================================================================
// PROPERTY TESTS - Quantization correctness
// ========================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(200))]

    /// Every output is an integer multiple of amax / max_bound
    #[test]
    fn prop_outputs_on_grid(
        values in prop::collection::vec(-20.0f32..20.0, 1..64),
        amax in 0.5f32..20.0,
        bits in prop::sample::select(vec![4u32, 8]),
        narrow in any::<bool>(),
    ) {
        let input = Tensor::from_vec(values, false);
        let out = fake_tensor_quant(&input, amax, bits, false, narrow).expect("valid args");
        let (_, max_bound) = quant_bounds(bits, false, narrow);
        let step = amax / max_bound;
        for &y in out.data() {
            let code = y / step;
            prop_assert!((code - code.round()).abs() < 1e-3, "{y} is off-grid");
        }
    }

    /// Outputs stay within the representable range
    #[test]
    fn prop_outputs_bounded(
        values in prop::collection::vec(-50.0f32..50.0, 1..64),
        amax in 0.5f32..20.0,
        bits in prop::sample::select(vec![4u32, 8]),
        narrow in any::<bool>(),
    ) {
        let input = Tensor::from_vec(values, false);
        let out = fake_tensor_quant(&input, amax, bits, false, narrow).expect("valid args");
        let (min_bound, max_bound) = quant_bounds(bits, false, narrow);
        let scale = max_bound / amax;
        for &y in out.data() {
            prop_assert!(y <= max_bound / scale + 1e-5);
            prop_assert!(y >= min_bound / scale - 1e-5);
        }
    }

    /// Quantization error inside the clip range is at most half a step
    #[test]
    fn prop_error_within_half_step(
        values in prop::collection::vec(-1.0f32..1.0, 1..64),
        bits in prop::sample::select(vec![4u32, 8]),
    ) {
        let input = Tensor::from_vec(values.clone(), false);
        let out = fake_tensor_quant(&input, 1.0, bits, false, true).expect("valid args");
        let (_, max_bound) = quant_bounds(bits, false, true);
        let half_step = 0.5 / max_bound;
        for (&x, &y) in values.iter().zip(out.data()) {
            prop_assert!((x - y).abs() <= half_step + 1e-6);
        }
    }

    /// Fake quantization is idempotent
    #[test]
    fn prop_idempotent(
        values in prop::collection::vec(-10.0f32..10.0, 1..32),
        amax in 0.5f32..10.0,
    ) {
        let input = Tensor::from_vec(values, false);
        let once = fake_tensor_quant(&input, amax, 8, false, false).expect("valid args");
        let twice = fake_tensor_quant(&once, amax, 8, false, false).expect("valid args");
        for (&a, &b) in once.data().iter().zip(twice.data()) {
            prop_assert!((a - b).abs() < 1e-5);
        }
    }
}

// ========================================================================
// UNIT TESTS - fake_tensor_quant
// ========================================================================

#[test]
fn test_4bit_narrow_grid() {
    // 4-bit narrow: max_bound = 7, amax = 16 -> step 16/7
    let input = Tensor::from_vec(vec![1.0, 2.0, 16.0, 30.0, -30.0], false);
    let out = fake_tensor_quant(&input, 16.0, 4, false, true).expect("valid args");
    let step = 16.0 / 7.0;
    assert_abs_diff_eq!(out.data()[0], 0.0);
    assert_abs_diff_eq!(out.data()[1], step, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data()[2], 16.0, epsilon = 1e-5);
    assert_abs_diff_eq!(out.data()[3], 16.0, epsilon = 1e-5);
    assert_abs_diff_eq!(out.data()[4], -16.0, epsilon = 1e-5);
}

#[test]
fn test_full_range_reaches_min_code() {
    // 8-bit full range: codes [-128, 127]
    let input = Tensor::from_vec(vec![-5.0], false);
    let out = fake_tensor_quant(&input, 1.0, 8, false, false).expect("valid args");
    assert_abs_diff_eq!(out.data()[0], -128.0 / 127.0, epsilon = 1e-6);
}

#[test]
fn test_unsigned_range() {
    // 4-bit unsigned: max_bound = 15
    let input = Tensor::from_vec(vec![0.0, 8.0, 40.0], false);
    let out = fake_tensor_quant(&input, 16.0, 4, true, true).expect("valid args");
    assert_abs_diff_eq!(out.data()[0], 0.0);
    // 8 * 15/16 = 7.5 rounds to the even code 8
    assert_abs_diff_eq!(out.data()[1], 16.0 / 15.0 * 8.0, epsilon = 1e-5);
    assert_abs_diff_eq!(out.data()[2], 16.0, epsilon = 1e-5);
}

#[test]
fn test_unsigned_rejects_negative() {
    let input = Tensor::from_vec(vec![0.5, -0.1], false);
    let err = fake_tensor_quant(&input, 1.0, 8, true, false);
    assert!(matches!(err, Err(QuantError::NegativeUnsigned(_))));
}

#[test]
fn test_round_half_to_even() {
    // scale = 127 / 127 = 1.0, so 2.5 -> 2 and 3.5 -> 4
    let input = Tensor::from_vec(vec![2.5, 3.5, -2.5], false);
    let out = fake_tensor_quant(&input, 127.0, 8, false, true).expect("valid args");
    assert_abs_diff_eq!(out.data()[0], 2.0);
    assert_abs_diff_eq!(out.data()[1], 4.0);
    assert_abs_diff_eq!(out.data()[2], -2.0);
}

#[test]
fn test_tiny_amax_outputs_zero() {
    let input = Tensor::from_vec(vec![1.0, -3.0, 0.5], false);
    let out = fake_tensor_quant(&input, 0.0, 8, false, false).expect("zero amax is valid");
    assert!(out.data().iter().all(|&v| v == 0.0));

    let out = fake_tensor_quant(&input, AMAX_EPSILON, 8, false, false).expect("valid args");
    assert!(out.data().iter().all(|&v| v == 0.0));
}

#[test]
fn test_invalid_amax_and_bits() {
    let input = Tensor::from_vec(vec![1.0], false);
    assert!(matches!(
        fake_tensor_quant(&input, -1.0, 8, false, false),
        Err(QuantError::InvalidAmax(_))
    ));
    assert!(matches!(
        fake_tensor_quant(&input, f32::NAN, 8, false, false),
        Err(QuantError::InvalidAmax(_))
    ));
    assert!(matches!(
        fake_tensor_quant(&input, 1.0, 1, false, false),
        Err(QuantError::InvalidNumBits(1))
    ));
}

#[test]
fn test_preserves_shape() {
    let input = Tensor::from_shape_vec(&[2, 3], vec![0.1; 6], false).expect("valid shape");
    let out = fake_tensor_quant(&input, 1.0, 8, false, false).expect("valid args");
    assert_eq!(out.shape(), &[2, 3]);
}

#[test]
fn test_ste_backward_masks_outside_amax() {
    let input = Tensor::from_vec(vec![-3.0, -0.5, 0.0, 0.9, 2.0], true);
    let mut out = fake_tensor_quant(&input, 1.0, 8, false, false).expect("valid args");
    backward(&mut out, Some(Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0])));

    let grad = input.grad().expect("input should have a gradient");
    assert_eq!(grad.to_vec(), vec![0.0, 2.0, 3.0, 4.0, 0.0]);
}

#[test]
fn test_no_grad_no_backward_op() {
    let input = Tensor::from_vec(vec![0.5], false);
    let out = fake_tensor_quant(&input, 1.0, 8, false, false).expect("valid args");
    assert!(!out.requires_grad());
    assert!(out.backward_op().is_none());
}

// ========================================================================
// UNIT TESTS - clip
// ========================================================================

#[test]
fn test_clip_forward() {
    let input = Tensor::from_vec(vec![-5.0, -1.0, 0.5, 3.0], false);
    let min = Tensor::scalar(-2.0, false);
    let max = Tensor::scalar(2.0, false);
    let out = clip(&input, &min, &max);
    assert_eq!(out.data().to_vec(), vec![-2.0, -1.0, 0.5, 2.0]);
}

#[test]
fn test_clip_gradients_route_to_bounds() {
    let input = Tensor::from_vec(vec![-5.0, -1.0, 0.5, 3.0, 4.0], true);
    let min = Tensor::scalar(-2.0, true);
    let max = Tensor::scalar(2.0, true);
    let mut out = clip(&input, &min, &max);
    backward(&mut out, Some(Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0])));

    let grad_input = input.grad().expect("input gradient");
    assert_eq!(grad_input.to_vec(), vec![0.0, 2.0, 3.0, 0.0, 0.0]);
    assert_abs_diff_eq!(min.grad().expect("min gradient")[0], 1.0);
    assert_abs_diff_eq!(max.grad().expect("max gradient")[0], 9.0);
}

#[test]
fn test_clip_then_quant_chain() {
    // learned-amax path: clip to [-amax, amax], quantize, backprop to amax
    let input = Tensor::from_vec(vec![-3.0, 0.25, 3.0], false);
    let min = Tensor::scalar(-1.0, true);
    let max = Tensor::scalar(1.0, true);
    let clipped = clip(&input, &min, &max);
    let mut out = fake_tensor_quant(&clipped, 1.0, 8, false, true).expect("valid args");
    backward(&mut out, None);

    assert_abs_diff_eq!(min.grad().expect("min gradient")[0], 1.0);
    assert_abs_diff_eq!(max.grad().expect("max gradient")[0], 1.0);
}

#[test]
fn test_fake_quantize_value() {
    assert_abs_diff_eq!(fake_quantize_value(0.26, 10.0, -127.0, 127.0), 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(fake_quantize_value(100.0, 1.0, -127.0, 127.0), 127.0);
}
