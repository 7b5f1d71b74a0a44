//! Quantization-aware linear layer

use super::config::QuantLinearConfig;
use crate::autograd::{add_bias, linear};
use crate::error::{QuantError, Result};
use crate::nn::Linear;
use crate::quant::{QuantDescriptor, QuantModule, QuantRole, TensorQuantizer};
use crate::Tensor;
use std::fmt;
use tracing::debug;

/// Linear layer with fake-quantized input, weight and (optionally) output
///
/// Forward order:
/// 1. quantize the input (skipped for encoder outputs)
/// 2. quantize the weight (skipped when weight quantization is off)
/// 3. `x @ Wᵗ`
/// 4. quantize the result (only when output quantization is on)
/// 5. add the bias, unquantized
#[derive(Clone, Debug)]
pub struct QuantLinear {
    config: QuantLinearConfig,
    linear: Linear,
    input_quant: Option<TensorQuantizer>,
    weight_quant: Option<TensorQuantizer>,
    output_quant: Option<TensorQuantizer>,
}

impl QuantLinear {
    /// Create a layer with freshly initialised parameters
    pub fn new(config: QuantLinearConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let linear = Linear::new(config.in_features, config.out_features, config.bias, seed)?;
        Self::from_linear(config, linear)
    }

    /// Wrap an existing layer
    ///
    /// The layer's dimensions must match `config`; its bias decides `config.bias`.
    pub fn from_linear(mut config: QuantLinearConfig, linear: Linear) -> Result<Self> {
        config.validate()?;
        if linear.in_features() != config.in_features
            || linear.out_features() != config.out_features
        {
            return Err(QuantError::ShapeMismatch {
                expected: format!("[{}, {}]", config.out_features, config.in_features),
                actual: format!("[{}, {}]", linear.out_features(), linear.in_features()),
            });
        }
        config.bias = linear.bias().is_some();

        let input_quant = make_quantizer(config.input_descriptor(), QuantRole::Input)?;
        let weight_quant = make_quantizer(config.weight_descriptor(), QuantRole::Weight)?;
        let output_quant = make_quantizer(config.output_descriptor(), QuantRole::Output)?;

        debug!(
            in_features = config.in_features,
            out_features = config.out_features,
            profile = %config.profile,
            pre_activation = %config.pre_activation,
            quantize_weight = config.quantize_weight,
            quantize_output = config.quantize_output,
            "created quantized linear layer"
        );

        Ok(Self {
            config,
            linear,
            input_quant,
            weight_quant,
            output_quant,
        })
    }

    /// `input [..., in_features]` → `[..., out_features]`
    pub fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.linear.check_input(input)?;

        let x = match self.input_quant.as_mut() {
            Some(q) => q.forward(input)?,
            None => input.clone(),
        };

        let w = match self.weight_quant.as_mut() {
            Some(q) => q.forward(self.linear.weight())?,
            None => self.linear.weight().clone(),
        };

        let mut out = linear(&x, &w, self.config.in_features, self.config.out_features);

        if let Some(q) = self.output_quant.as_mut() {
            out = q.forward(&out)?;
        }

        Ok(match self.linear.bias() {
            Some(b) => add_bias(&out, b),
            None => out,
        })
    }

    pub fn config(&self) -> &QuantLinearConfig {
        &self.config
    }

    pub fn input_quantizer(&self) -> Option<&TensorQuantizer> {
        self.input_quant.as_ref()
    }

    pub fn weight_quantizer(&self) -> Option<&TensorQuantizer> {
        self.weight_quant.as_ref()
    }

    pub fn output_quantizer(&self) -> Option<&TensorQuantizer> {
        self.output_quant.as_ref()
    }

    pub fn input_quantizer_mut(&mut self) -> Option<&mut TensorQuantizer> {
        self.input_quant.as_mut()
    }

    pub fn weight_quantizer_mut(&mut self) -> Option<&mut TensorQuantizer> {
        self.weight_quant.as_mut()
    }

    pub fn output_quantizer_mut(&mut self) -> Option<&mut TensorQuantizer> {
        self.output_quant.as_mut()
    }

    /// Underlying full-precision layer
    pub fn linear(&self) -> &Linear {
        &self.linear
    }

    /// Weight, bias, then learned clip bounds
    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.linear.parameters();
        for q in self.quantizers() {
            if let Some(range) = q.learned_range() {
                params.extend([&range.min, &range.max].into_iter().filter(|t| t.requires_grad()));
            }
        }
        params
    }

    /// Trainable tensors for an optimizer step
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.linear.parameters_mut();
        for q in [&mut self.input_quant, &mut self.weight_quant, &mut self.output_quant]
            .into_iter()
            .flatten()
        {
            params.extend(q.trainable_params());
        }
        params
    }

    fn quantizers(&self) -> impl Iterator<Item = &TensorQuantizer> {
        [&self.input_quant, &self.weight_quant, &self.output_quant]
            .into_iter()
            .flatten()
    }
}

impl QuantModule for QuantLinear {
    fn quantizers_mut(&mut self) -> Vec<&mut TensorQuantizer> {
        [&mut self.input_quant, &mut self.weight_quant, &mut self.output_quant]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl fmt::Display for QuantLinear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QuantLinear(in_features={}, out_features={}, bias={}, profile={}, pre_activation={})",
            self.config.in_features,
            self.config.out_features,
            self.config.bias,
            self.config.profile,
            self.config.pre_activation
        )
    }
}

fn make_quantizer(
    descriptor: Option<QuantDescriptor>,
    role: QuantRole,
) -> Result<Option<TensorQuantizer>> {
    descriptor
        .map(|d| TensorQuantizer::new(d, role))
        .transpose()
}
