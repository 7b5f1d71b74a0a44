//! Tensor quantizer state machine

use crate::error::{QuantError, Result};
use crate::quant::calibration::Calibrator;
use crate::quant::descriptor::QuantDescriptor;
use crate::quant::fake_quantize::{clip, fake_tensor_quant, AMAX_EPSILON};
use crate::Tensor;
use std::fmt;
use tracing::{debug, warn};

/// Which tensor of a layer a quantizer is attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuantRole {
    Input,
    Weight,
    Output,
}

impl fmt::Display for QuantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Weight => "weight",
            Self::Output => "output",
        };
        f.write_str(name)
    }
}

/// Trainable clip bounds for a learned-amax quantizer
///
/// `min` is fixed at zero (and not trainable) for unsigned quantizers.
#[derive(Clone, Debug)]
pub struct LearnedRange {
    pub min: Tensor,
    pub max: Tensor,
}

impl LearnedRange {
    fn new(amax: f32, unsigned: bool) -> Self {
        let min = if unsigned {
            Tensor::scalar(0.0, false)
        } else {
            Tensor::scalar(-amax, true)
        };
        Self {
            min,
            max: Tensor::scalar(amax, true),
        }
    }

    /// Effective amax: `max(|min|, |max|)`
    pub fn amax(&self) -> f32 {
        self.min.data()[0].abs().max(self.max.data()[0].abs())
    }
}

/// Fake quantizer for one tensor role
#[derive(Clone, Debug)]
pub struct TensorQuantizer {
    descriptor: QuantDescriptor,
    role: QuantRole,
    amax: Option<f32>,
    learned: Option<LearnedRange>,
    calibrator: Calibrator,
    disabled: bool,
    quant: bool,
    clip: bool,
    calib: bool,
}

impl TensorQuantizer {
    /// Create a quantizer from a validated descriptor
    ///
    /// Starts enabled with quantization on and calibration off. Learned-amax
    /// descriptors get a clip range initialised to `±amax` with clipping on.
    pub fn new(descriptor: QuantDescriptor, role: QuantRole) -> Result<Self> {
        descriptor.validate()?;

        let learned = match (descriptor.learn_amax(), descriptor.amax()) {
            (true, Some(amax)) => Some(LearnedRange::new(amax, descriptor.unsigned())),
            (true, None) => return Err(QuantError::MissingAmax),
            (false, _) => None,
        };

        Ok(Self {
            descriptor,
            role,
            amax: descriptor.amax(),
            clip: learned.is_some(),
            learned,
            calibrator: Calibrator::new(descriptor.calib_method(), descriptor.unsigned()),
            disabled: false,
            quant: true,
            calib: false,
        })
    }

    /// Apply the quantizer according to its current flags
    pub fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        if self.disabled {
            return Ok(input.clone());
        }

        if self.calib {
            self.calibrator.collect_tensor(input)?;
        }

        let mut output = input.clone();

        if self.clip {
            if let Some(range) = &self.learned {
                output = clip(&output, &range.min, &range.max);
            }
        }

        if self.quant {
            let amax = self.effective_amax(input);
            output = fake_tensor_quant(
                &output,
                amax,
                self.descriptor.num_bits(),
                self.descriptor.unsigned(),
                self.descriptor.narrow_range(),
            )?;
        }

        Ok(output)
    }

    /// Learned bound, then fixed amax, then max |x| of this input
    fn effective_amax(&self, input: &Tensor) -> f32 {
        if let Some(range) = &self.learned {
            return range.amax();
        }
        self.amax
            .unwrap_or_else(|| input.data().iter().fold(0.0f32, |m, &x| m.max(x.abs())))
    }

    // Mode flags

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable_quant(&mut self) {
        self.quant = true;
    }

    pub fn disable_quant(&mut self) {
        self.quant = false;
    }

    pub fn enable_calib(&mut self) {
        self.calib = true;
    }

    pub fn disable_calib(&mut self) {
        self.calib = false;
    }

    /// Turn on the learned clip; no effect without learned amax
    pub fn enable_clip(&mut self) {
        self.clip = self.learned.is_some();
    }

    pub fn disable_clip(&mut self) {
        self.clip = false;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn is_quant_enabled(&self) -> bool {
        self.quant
    }

    pub fn is_calib_enabled(&self) -> bool {
        self.calib
    }

    pub fn is_clip_enabled(&self) -> bool {
        self.clip
    }

    /// Set amax from calibration data
    ///
    /// Learned-amax quantizers also reset their clip range to the new amax.
    pub fn load_calib_amax(&mut self) -> Result<f32> {
        let amax = self
            .calibrator
            .compute_amax()
            .ok_or_else(|| QuantError::CalibrationRequired(self.role.to_string()))?;

        if amax <= AMAX_EPSILON {
            warn!(
                role = %self.role,
                amax,
                "calibrated amax is near zero; quantizer will output zeros"
            );
        }

        self.amax = Some(amax);
        self.init_learn_amax();

        debug!(
            role = %self.role,
            amax,
            batches = self.calibrator.num_batches(),
            calibrator = self.calibrator.name(),
            "loaded calibrated amax"
        );
        Ok(amax)
    }

    /// Reset the learned clip range to `±amax`
    pub fn init_learn_amax(&mut self) {
        let (Some(range), Some(amax)) = (self.learned.as_mut(), self.amax) else {
            return;
        };
        if !self.descriptor.unsigned() {
            range.min.data_mut()[0] = -amax;
        }
        range.max.data_mut()[0] = amax;
    }

    /// Overwrite amax (and the learned range, if any)
    pub fn set_amax(&mut self, amax: f32) -> Result<()> {
        if !amax.is_finite() || amax < 0.0 {
            return Err(QuantError::InvalidAmax(amax));
        }
        self.amax = Some(amax);
        self.init_learn_amax();
        Ok(())
    }

    /// Current amax: the learned bound if present, else the stored value
    pub fn amax(&self) -> Option<f32> {
        self.learned.as_ref().map(LearnedRange::amax).or(self.amax)
    }

    pub fn descriptor(&self) -> &QuantDescriptor {
        &self.descriptor
    }

    pub fn role(&self) -> QuantRole {
        self.role
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn learned_range(&self) -> Option<&LearnedRange> {
        self.learned.as_ref()
    }

    /// Trainable clip bounds
    pub fn trainable_params(&mut self) -> Vec<&mut Tensor> {
        match self.learned.as_mut() {
            Some(range) => [&mut range.min, &mut range.max]
                .into_iter()
                .filter(|t| t.requires_grad())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for TensorQuantizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.descriptor;
        write!(f, "TensorQuantizer({}: {}bit", self.role, d.num_bits())?;
        if d.unsigned() {
            write!(f, " unsigned")?;
        }
        if d.narrow_range() {
            write!(f, " narrow")?;
        }
        match self.amax() {
            Some(amax) => write!(f, " amax={amax:.4}")?,
            None => write!(f, " dynamic-amax")?,
        }
        if d.learn_amax() {
            write!(f, " learned")?;
        }
        write!(f, " calib={}", self.calibrator.name())?;

        if self.disabled {
            return write!(f, " disabled)");
        }
        for (on, name) in [(self.quant, "quant"), (self.clip, "clip"), (self.calib, "calib")] {
            if on {
                write!(f, " {name}")?;
            }
        }
        write!(f, ")")
    }
}
