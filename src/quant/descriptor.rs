//! Quantizer descriptors
//!
//! A [`QuantDescriptor`] fixes everything about how one tensor role is
//! quantized: bit width, signedness, range, and where amax comes from. It is
//! `Copy` and const-constructible so the role presets can be plain constants.

use super::calibration::CalibMethod;
use crate::error::{QuantError, Result};
use std::fmt;

/// Per-tensor fake-quantization descriptor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantDescriptor {
    num_bits: u32,
    narrow_range: bool,
    learn_amax: bool,
    amax: Option<f32>,
    unsigned: bool,
    calib_method: CalibMethod,
}

impl QuantDescriptor {
    /// Signed, full-range descriptor with dynamic amax and max calibration
    pub const fn new(num_bits: u32) -> Self {
        Self {
            num_bits,
            narrow_range: false,
            learn_amax: false,
            amax: None,
            unsigned: false,
            calib_method: CalibMethod::Max,
        }
    }

    /// Exclude the most negative code so the range is symmetric
    pub const fn with_narrow_range(self, narrow_range: bool) -> Self {
        Self { narrow_range, ..self }
    }

    /// Make amax a trainable clip bound
    pub const fn with_learn_amax(self, learn_amax: bool) -> Self {
        Self { learn_amax, ..self }
    }

    /// Fixed (or initial, when learned) clipping threshold
    pub const fn with_amax(self, amax: f32) -> Self {
        Self {
            amax: Some(amax),
            ..self
        }
    }

    /// Quantize to `[0, 2^bits - 1]` instead of a signed range
    pub const fn with_unsigned(self, unsigned: bool) -> Self {
        Self { unsigned, ..self }
    }

    pub const fn with_calib_method(self, calib_method: CalibMethod) -> Self {
        Self {
            calib_method,
            ..self
        }
    }

    /// Check bit width, amax and calibration settings
    pub fn validate(&self) -> Result<()> {
        if !(2..=16).contains(&self.num_bits) {
            return Err(QuantError::InvalidNumBits(self.num_bits));
        }
        if let Some(amax) = self.amax {
            if !amax.is_finite() || amax < 0.0 {
                return Err(QuantError::InvalidAmax(amax));
            }
        }
        if self.learn_amax && self.amax.is_none() {
            return Err(QuantError::MissingAmax);
        }
        self.calib_method.validate()
    }

    /// Integer range `(min_bound, max_bound)` as floats
    ///
    /// `max = 2^(bits - 1 + unsigned) - 1`; `min` is 0 when unsigned,
    /// `-max` when narrow, `-max - 1` otherwise.
    pub fn bounds(&self) -> (f32, f32) {
        quant_bounds(self.num_bits, self.unsigned, self.narrow_range)
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    pub fn narrow_range(&self) -> bool {
        self.narrow_range
    }

    pub fn learn_amax(&self) -> bool {
        self.learn_amax
    }

    pub fn amax(&self) -> Option<f32> {
        self.amax
    }

    pub fn unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn calib_method(&self) -> CalibMethod {
        self.calib_method
    }
}

impl Default for QuantDescriptor {
    fn default() -> Self {
        Self::new(8)
    }
}

impl fmt::Display for QuantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bit", self.num_bits)?;
        if self.unsigned {
            write!(f, " unsigned")?;
        }
        if self.narrow_range {
            write!(f, " narrow")?;
        }
        match self.amax {
            Some(amax) if self.learn_amax => write!(f, " learned-amax={amax:.4}"),
            Some(amax) => write!(f, " amax={amax:.4}"),
            None => write!(f, " dynamic-amax"),
        }
    }
}

/// Integer range for a bit width, signedness and narrow-range flag
pub fn quant_bounds(num_bits: u32, unsigned: bool, narrow_range: bool) -> (f32, f32) {
    let exponent = (num_bits.saturating_sub(1) + u32::from(unsigned)).min(31);
    let max_bound = ((1u64 << exponent) - 1) as f32;
    let min_bound = if unsigned {
        0.0
    } else if narrow_range {
        -max_bound
    } else {
        -max_bound - 1.0
    };
    (min_bound, max_bound)
}
