//! Dense affine layer: `y = x @ Wᵗ + b`

use crate::autograd::{add_bias, linear};
use crate::error::{QuantError, Result};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fully connected layer
#[derive(Clone, Debug)]
pub struct Linear {
    /// Weight [out_features, in_features], stored flat
    weight: Tensor,
    /// Optional bias [out_features]
    bias: Option<Tensor>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Create a layer with weight and bias drawn from `U(-k, k)`, `k = 1/sqrt(in_features)`
    pub fn new(in_features: usize, out_features: usize, bias: bool, seed: u64) -> Result<Self> {
        check_dims(in_features, out_features)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let bound = 1.0 / (in_features as f32).sqrt();

        let weight: Vec<f32> = (0..out_features * in_features)
            .map(|_| rng.random_range(-bound..bound))
            .collect();
        let bias = bias.then(|| {
            let data: Vec<f32> = (0..out_features)
                .map(|_| rng.random_range(-bound..bound))
                .collect();
            Tensor::from_vec(data, true)
        });

        Ok(Self {
            weight: Tensor::from_shape_vec(&[out_features, in_features], weight, true)?,
            bias,
            in_features,
            out_features,
        })
    }

    /// Wrap existing parameters
    pub fn from_tensors(
        weight: Tensor,
        bias: Option<Tensor>,
        in_features: usize,
        out_features: usize,
    ) -> Result<Self> {
        check_dims(in_features, out_features)?;

        if weight.len() != out_features * in_features {
            return Err(QuantError::ShapeMismatch {
                expected: format!("weight [{out_features}, {in_features}]"),
                actual: format!("{} elements", weight.len()),
            });
        }
        let weight = weight.reshape(&[out_features, in_features])?;

        if let Some(b) = &bias {
            if b.len() != out_features {
                return Err(QuantError::ShapeMismatch {
                    expected: format!("bias [{out_features}]"),
                    actual: format!("{:?}", b.shape()),
                });
            }
        }

        Ok(Self {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    /// `input [..., in_features]` → `[..., out_features]`
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        self.check_input(input)?;
        let out = linear(input, &self.weight, self.in_features, self.out_features);
        Ok(match &self.bias {
            Some(b) => add_bias(&out, b),
            None => out,
        })
    }

    /// Input must have last dimension `in_features`; zero rows are allowed
    pub fn check_input(&self, input: &Tensor) -> Result<()> {
        if input.last_dim() != self.in_features {
            return Err(QuantError::ShapeMismatch {
                expected: format!("[..., {}]", self.in_features),
                actual: format!("{:?}", input.shape()),
            });
        }
        Ok(())
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Weight and bias, in that order
    pub fn parameters(&self) -> Vec<&Tensor> {
        std::iter::once(&self.weight).chain(self.bias.as_ref()).collect()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        std::iter::once(&mut self.weight)
            .chain(self.bias.as_mut())
            .collect()
    }
}

fn check_dims(in_features: usize, out_features: usize) -> Result<()> {
    if in_features == 0 {
        return Err(QuantError::InvalidDimension {
            name: "in_features",
        });
    }
    if out_features == 0 {
        return Err(QuantError::InvalidDimension {
            name: "out_features",
        });
    }
    Ok(())
}
