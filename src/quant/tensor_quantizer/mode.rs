//! PTQ / QAT mode switching over anything that owns quantizers

use super::TensorQuantizer;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Types that expose their tensor quantizers
pub trait QuantModule {
    fn quantizers_mut(&mut self) -> Vec<&mut TensorQuantizer>;
}

impl QuantModule for TensorQuantizer {
    fn quantizers_mut(&mut self) -> Vec<&mut TensorQuantizer> {
        vec![self]
    }
}

impl<T: QuantModule> QuantModule for [T] {
    fn quantizers_mut(&mut self) -> Vec<&mut TensorQuantizer> {
        self.iter_mut().flat_map(|m| m.quantizers_mut()).collect()
    }
}

impl<T: QuantModule> QuantModule for Vec<T> {
    fn quantizers_mut(&mut self) -> Vec<&mut TensorQuantizer> {
        self.as_mut_slice().quantizers_mut()
    }
}

/// Quantization mode applied to a whole module
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantMode {
    /// Fake quantization with learned clipping
    #[default]
    Qat,
    /// Calibration only, no quantization
    Ptq,
    /// All quantizers pass through
    Disabled,
}

impl fmt::Display for QuantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Qat => "qat",
            Self::Ptq => "ptq",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Enable every quantizer
pub fn enable_quant<M: QuantModule + ?Sized>(module: &mut M) {
    for q in module.quantizers_mut() {
        q.enable();
    }
}

/// Disable every quantizer (identity pass-through)
pub fn disable_quant<M: QuantModule + ?Sized>(module: &mut M) {
    for q in module.quantizers_mut() {
        q.disable();
    }
}

/// Quantization-aware training: quant and clip on, calibration off
pub fn qat_mode<M: QuantModule + ?Sized>(module: &mut M) {
    let quantizers = module.quantizers_mut();
    debug!(count = quantizers.len(), "switching quantizers to QAT mode");
    for q in quantizers {
        q.enable();
        q.disable_calib();
        q.enable_quant();
        q.enable_clip();
    }
}

/// Post-training calibration: collect statistics, quant and clip off
pub fn ptq_mode<M: QuantModule + ?Sized>(module: &mut M) {
    let quantizers = module.quantizers_mut();
    debug!(count = quantizers.len(), "switching quantizers to PTQ mode");
    for q in quantizers {
        q.enable();
        q.enable_calib();
        q.disable_quant();
        q.disable_clip();
    }
}

pub fn set_mode<M: QuantModule + ?Sized>(module: &mut M, mode: QuantMode) {
    match mode {
        QuantMode::Qat => qat_mode(module),
        QuantMode::Ptq => ptq_mode(module),
        QuantMode::Disabled => disable_quant(module),
    }
}

/// Load calibrated amax into every enabled quantizer
///
/// Fails on the first enabled quantizer that has seen no data.
pub fn load_calib_amax<M: QuantModule + ?Sized>(module: &mut M) -> Result<()> {
    for q in module.quantizers_mut() {
        if !q.is_enabled() {
            debug!(role = %q.role(), "skipping disabled quantizer");
            continue;
        }
        q.load_calib_amax()?;
    }
    Ok(())
}
