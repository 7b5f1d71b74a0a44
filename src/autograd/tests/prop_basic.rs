//! Property tests for element-wise ops and the sum reduction

use super::test_utils::{max_grad_error, numerical_grad};
use crate::autograd::{add, backward, mul, relu, scale, sum, Tensor};
use proptest::prelude::*;

fn pairs(len: std::ops::Range<usize>) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    prop::collection::vec((-4.0f32..4.0, -4.0f32..4.0), len)
        .prop_map(|xy| xy.into_iter().unzip())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_elementwise_ops_keep_shape(
        (x, y) in pairs(6..7),
        factor in -3.0f32..3.0,
    ) {
        let a = Tensor::from_shape_vec(&[2, 3], x, false).expect("shape");
        let b = Tensor::from_shape_vec(&[2, 3], y, false).expect("shape");
        let added = add(&a, &b);
        let multiplied = mul(&a, &b);
        let scaled = scale(&a, factor);
        let rectified = relu(&a);
        let summed = sum(&a);
        prop_assert_eq!(added.shape(), &[2, 3]);
        prop_assert_eq!(multiplied.shape(), &[2, 3]);
        prop_assert_eq!(scaled.shape(), &[2, 3]);
        prop_assert_eq!(rectified.shape(), &[2, 3]);
        prop_assert_eq!(summed.shape(), &[1]);
    }

    #[test]
    fn prop_shifted_scaled_sum_gradient_is_factor(
        (x, y) in pairs(1..16),
        factor in -3.0f32..3.0,
    ) {
        // d/dx sum(k * (x + y)) = k, and the same for y
        let a = Tensor::from_vec(x, true);
        let b = Tensor::from_vec(y, true);
        let mut loss = sum(&scale(&add(&a, &b), factor));
        backward(&mut loss, None);

        let grad_a = a.grad().expect("grad");
        let grad_b = b.grad().expect("grad");
        prop_assert!(grad_a.iter().chain(grad_b.iter()).all(|&g| (g - factor).abs() < 1e-6));
    }

    #[test]
    fn prop_mul_gradient_is_other_operand((x, y) in pairs(1..16)) {
        let a = Tensor::from_vec(x.clone(), true);
        let b = Tensor::from_vec(y.clone(), true);
        let mut loss = sum(&mul(&a, &b));
        backward(&mut loss, None);

        prop_assert!(max_grad_error(&a.grad().expect("grad"), &y) < 1e-6);
        prop_assert!(max_grad_error(&b.grad().expect("grad"), &x) < 1e-6);
    }

    #[test]
    fn prop_relu_gradient_is_positive_mask(x in prop::collection::vec(-4.0f32..4.0, 1..32)) {
        let a = Tensor::from_vec(x.clone(), true);
        let mut loss = sum(&relu(&a));
        backward(&mut loss, None);

        let mask: Vec<f32> = x.iter().map(|&v| if v > 0.0 { 1.0 } else { 0.0 }).collect();
        prop_assert_eq!(max_grad_error(&a.grad().expect("grad"), &mask), 0.0);
    }

    #[test]
    fn prop_relu_product_matches_numerical(
        (x, y) in pairs(1..12),
    ) {
        // Keep x away from the ReLU kink so central differences are exact
        let x: Vec<f32> = x.into_iter().map(|v| if v.abs() < 0.1 { v + 0.25 } else { v }).collect();

        let a = Tensor::from_vec(x.clone(), true);
        let b = Tensor::from_vec(y.clone(), false);
        let mut loss = sum(&mul(&relu(&a), &b));
        backward(&mut loss, None);

        let numerical = numerical_grad(
            |v| {
                let t = Tensor::from_vec(v.to_vec(), false);
                sum(&mul(&relu(&t), &Tensor::from_vec(y.clone(), false))).data()[0]
            },
            &x,
            1e-2,
        );
        prop_assert!(max_grad_error(&a.grad().expect("grad"), &numerical) < 1e-2);
    }
}
