//! Quantized linear layer configuration

use crate::error::{QuantError, Result};
use crate::quant::{CalibMethod, QuantDescriptor, QuantProfile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What produced the layer's input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreActivation {
    /// Signed activations
    #[default]
    None,
    /// Output of a ReLU: quantized with the unsigned range
    Relu,
    /// Encoder output: left unquantized
    EncoderOut,
}

impl FromStr for PreActivation {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "relu" => Ok(Self::Relu),
            "encoder_out" => Ok(Self::EncoderOut),
            other => Err(QuantError::UnknownPreActivation(other.to_string())),
        }
    }
}

impl fmt::Display for PreActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Relu => "relu",
            Self::EncoderOut => "encoder_out",
        };
        f.write_str(name)
    }
}

/// Shape and quantization settings for a [`QuantLinear`](super::QuantLinear)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantLinearConfig {
    pub in_features: usize,
    pub out_features: usize,
    pub bias: bool,
    pub pre_activation: PreActivation,
    pub profile: QuantProfile,
    /// Fake-quantize the weight matrix
    pub quantize_weight: bool,
    /// Fake-quantize the pre-bias output
    pub quantize_output: bool,
    /// Calibrator used by every quantizer of the layer
    pub calib_method: CalibMethod,
}

impl QuantLinearConfig {
    /// Int8 layer with bias, weight quantization on and output quantization off
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self {
            in_features,
            out_features,
            bias: true,
            pre_activation: PreActivation::None,
            profile: QuantProfile::Int8,
            quantize_weight: true,
            quantize_output: false,
            calib_method: CalibMethod::Max,
        }
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_pre_activation(mut self, pre_activation: PreActivation) -> Self {
        self.pre_activation = pre_activation;
        self
    }

    pub fn with_profile(mut self, profile: QuantProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_quantize_weight(mut self, quantize_weight: bool) -> Self {
        self.quantize_weight = quantize_weight;
        self
    }

    pub fn with_quantize_output(mut self, quantize_output: bool) -> Self {
        self.quantize_output = quantize_output;
        self
    }

    pub fn with_calib_method(mut self, calib_method: CalibMethod) -> Self {
        self.calib_method = calib_method;
        self
    }

    /// Input descriptor, `None` for encoder outputs
    pub fn input_descriptor(&self) -> Option<QuantDescriptor> {
        let presets = self.profile.presets();
        let desc = match self.pre_activation {
            PreActivation::None => presets.activation,
            PreActivation::Relu => presets.relu_activation,
            PreActivation::EncoderOut => return None,
        };
        Some(desc.with_calib_method(self.calib_method))
    }

    pub fn weight_descriptor(&self) -> Option<QuantDescriptor> {
        self.quantize_weight
            .then(|| self.profile.presets().weight.with_calib_method(self.calib_method))
    }

    pub fn output_descriptor(&self) -> Option<QuantDescriptor> {
        self.quantize_output
            .then(|| self.profile.presets().output.with_calib_method(self.calib_method))
    }

    pub fn validate(&self) -> Result<()> {
        if self.in_features == 0 {
            return Err(QuantError::InvalidDimension {
                name: "in_features",
            });
        }
        if self.out_features == 0 {
            return Err(QuantError::InvalidDimension {
                name: "out_features",
            });
        }
        self.calib_method.validate()
    }
}
