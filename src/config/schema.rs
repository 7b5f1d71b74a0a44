//! YAML schema for quantized layer specs

use super::validate::validate_spec;
use crate::error::Result;
use crate::nn::{PreActivation, QuantLinear, QuantLinearConfig};
use crate::quant::{set_mode, CalibMethod, QuantMode, QuantProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

fn default_bits() -> u8 {
    8
}

fn default_true() -> bool {
    true
}

/// Complete quantization spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantSpec {
    /// Bit width: 4 or 8
    #[serde(default = "default_bits")]
    pub bits: u8,

    /// Mode applied to every layer after construction
    #[serde(default)]
    pub mode: QuantMode,

    #[serde(default)]
    pub calibration: CalibMethod,

    /// Seed for parameter init; layer `i` uses `seed + i`
    #[serde(default)]
    pub seed: u64,

    pub layers: Vec<LayerSpec>,
}

/// One quantized linear layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub in_features: usize,
    pub out_features: usize,

    #[serde(default = "default_true")]
    pub bias: bool,

    #[serde(default)]
    pub pre_activation: PreActivation,

    #[serde(default = "default_true")]
    pub quantize_weight: bool,

    #[serde(default)]
    pub quantize_output: bool,
}

impl QuantSpec {
    /// Parse and validate a YAML spec
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        validate_spec(&spec)?;
        Ok(spec)
    }

    /// Load and validate a YAML spec from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)?;
        let spec = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), layers = spec.layers.len(), "loaded quantization spec");
        Ok(spec)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn profile(&self) -> Result<QuantProfile> {
        QuantProfile::from_bits(self.bits)
    }

    /// Layer config for `layer` under this spec's profile and calibration
    pub fn layer_config(&self, layer: &LayerSpec) -> Result<QuantLinearConfig> {
        Ok(QuantLinearConfig::new(layer.in_features, layer.out_features)
            .with_bias(layer.bias)
            .with_pre_activation(layer.pre_activation)
            .with_profile(self.profile()?)
            .with_quantize_weight(layer.quantize_weight)
            .with_quantize_output(layer.quantize_output)
            .with_calib_method(self.calibration))
    }

    /// Build every layer, in order, with the spec's mode applied
    pub fn build(&self) -> Result<Vec<(String, QuantLinear)>> {
        validate_spec(self)?;

        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let config = self.layer_config(layer)?;
                let mut built = QuantLinear::new(config, self.seed.wrapping_add(i as u64))?;
                set_mode(&mut built, self.mode);
                Ok((layer.name.clone(), built))
            })
            .collect()
    }
}
