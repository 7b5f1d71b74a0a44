//! Role presets for quantized linear layers
//!
//! Each profile fixes four descriptors: general activations, layer outputs,
//! activations that follow a ReLU (unsigned range), and weights.

use super::descriptor::QuantDescriptor;
use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ACT_QUANT_4BIT: QuantDescriptor = QuantDescriptor::new(4)
    .with_narrow_range(true)
    .with_amax(16.0);

pub const OUT_QUANT_4BIT: QuantDescriptor = QuantDescriptor::new(4)
    .with_narrow_range(true)
    .with_amax(16.0);

pub const RELU_QUANT_4BIT: QuantDescriptor = QuantDescriptor::new(4)
    .with_narrow_range(true)
    .with_amax(16.0)
    .with_unsigned(true);

pub const WEIGHT_QUANT_4BIT: QuantDescriptor = QuantDescriptor::new(4)
    .with_narrow_range(true)
    .with_amax(1.0);

pub const ACT_QUANT_8BIT: QuantDescriptor = QuantDescriptor::new(8)
    .with_narrow_range(true)
    .with_learn_amax(true)
    .with_amax(16.0);

pub const OUT_QUANT_8BIT: QuantDescriptor = QuantDescriptor::new(8)
    .with_narrow_range(true)
    .with_amax(16.0);

pub const RELU_QUANT_8BIT: QuantDescriptor = QuantDescriptor::new(8)
    .with_narrow_range(true)
    .with_learn_amax(true)
    .with_amax(16.0)
    .with_unsigned(true);

pub const WEIGHT_QUANT_8BIT: QuantDescriptor = QuantDescriptor::new(8)
    .with_narrow_range(true)
    .with_learn_amax(true)
    .with_amax(1.0);

/// Descriptors for every role in a quantized linear layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantPresets {
    pub activation: QuantDescriptor,
    pub output: QuantDescriptor,
    pub relu_activation: QuantDescriptor,
    pub weight: QuantDescriptor,
}

pub const INT4_PRESETS: QuantPresets = QuantPresets {
    activation: ACT_QUANT_4BIT,
    output: OUT_QUANT_4BIT,
    relu_activation: RELU_QUANT_4BIT,
    weight: WEIGHT_QUANT_4BIT,
};

pub const INT8_PRESETS: QuantPresets = QuantPresets {
    activation: ACT_QUANT_8BIT,
    output: OUT_QUANT_8BIT,
    relu_activation: RELU_QUANT_8BIT,
    weight: WEIGHT_QUANT_8BIT,
};

/// Bit-width profile for a quantized layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantProfile {
    /// 4-bit, fixed amax everywhere
    Int4,
    /// 8-bit, learned amax for activations and weights
    #[default]
    Int8,
}

impl QuantProfile {
    /// Profile for a bit width (4 or 8)
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            4 => Ok(Self::Int4),
            8 => Ok(Self::Int8),
            other => Err(QuantError::InvalidQuantBits(other)),
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            Self::Int4 => 4,
            Self::Int8 => 8,
        }
    }

    pub fn presets(&self) -> &'static QuantPresets {
        match self {
            Self::Int4 => &INT4_PRESETS,
            Self::Int8 => &INT8_PRESETS,
        }
    }
}

impl fmt::Display for QuantProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int{}", self.bits())
    }
}
