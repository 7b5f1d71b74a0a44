//! Amax calibrators
//!
//! The `Calibrator` enum dispatches to the concrete calibrator selected by a
//! descriptor's [`CalibMethod`].

use crate::error::{QuantError, Result};
use crate::Tensor;

use super::histogram::HistogramCalibrator;
use super::types::{CalibMethod, DEFAULT_NUM_BINS};

/// Running max |x| calibrator
#[derive(Clone, Debug)]
pub struct MaxCalibrator {
    /// Reject negative inputs (unsigned quantizers)
    unsigned: bool,
    /// Largest absolute value seen so far
    amax: Option<f32>,
    /// Number of batches observed
    num_batches: usize,
}

impl MaxCalibrator {
    pub fn new(unsigned: bool) -> Self {
        Self {
            unsigned,
            amax: None,
            num_batches: 0,
        }
    }

    /// Observe a batch of data
    pub fn collect(&mut self, data: &[f32]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        check_unsigned(data, self.unsigned)?;

        let batch_amax = data.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        self.amax = Some(self.amax.map_or(batch_amax, |m| m.max(batch_amax)));
        self.num_batches += 1;
        Ok(())
    }

    pub fn compute_amax(&self) -> Option<f32> {
        self.amax
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn reset(&mut self) {
        self.amax = None;
        self.num_batches = 0;
    }
}

/// Calibrator selected by [`CalibMethod`]
#[derive(Clone, Debug)]
pub enum Calibrator {
    Max(MaxCalibrator),
    Histogram(HistogramCalibrator),
}

impl Calibrator {
    /// Create the calibrator for `method`
    pub fn new(method: CalibMethod, unsigned: bool) -> Self {
        match method {
            CalibMethod::Max => Self::Max(MaxCalibrator::new(unsigned)),
            CalibMethod::Percentile { percentile } => Self::Histogram(HistogramCalibrator::new(
                DEFAULT_NUM_BINS,
                percentile,
                unsigned,
            )),
        }
    }

    /// Observe a batch of data
    pub fn collect(&mut self, data: &[f32]) -> Result<()> {
        match self {
            Self::Max(c) => c.collect(data),
            Self::Histogram(c) => c.collect(data),
        }
    }

    /// Observe a tensor
    pub fn collect_tensor(&mut self, tensor: &Tensor) -> Result<()> {
        match tensor.data().as_slice() {
            Some(slice) => self.collect(slice),
            None => self.collect(&tensor.data().to_vec()),
        }
    }

    /// Amax derived from everything observed, `None` before any data
    pub fn compute_amax(&self) -> Option<f32> {
        match self {
            Self::Max(c) => c.compute_amax(),
            Self::Histogram(c) => c.compute_amax(),
        }
    }

    pub fn num_batches(&self) -> usize {
        match self {
            Self::Max(c) => c.num_batches(),
            Self::Histogram(c) => c.num_batches(),
        }
    }

    /// Check if any data has been observed
    pub fn has_data(&self) -> bool {
        self.num_batches() > 0
    }

    /// Reset calibration state
    pub fn reset(&mut self) {
        match self {
            Self::Max(c) => c.reset(),
            Self::Histogram(c) => c.reset(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Max(_) => "max",
            Self::Histogram(_) => "histogram",
        }
    }
}

pub(super) fn check_unsigned(data: &[f32], unsigned: bool) -> Result<()> {
    if unsigned {
        let min = data.iter().copied().fold(f32::INFINITY, f32::min);
        if min < 0.0 {
            return Err(QuantError::NegativeUnsigned(min));
        }
    }
    Ok(())
}

/// Convenience function for max calibration of a single batch
pub fn calibrate_max(data: &[f32]) -> Option<f32> {
    let mut calibrator = MaxCalibrator::new(false);
    calibrator.collect(data).ok()?;
    calibrator.compute_amax()
}

/// Convenience function for percentile calibration of a single batch
pub fn calibrate_percentile(data: &[f32], percentile: f32) -> Result<Option<f32>> {
    CalibMethod::Percentile { percentile }.validate()?;
    let mut calibrator = HistogramCalibrator::new(DEFAULT_NUM_BINS, percentile, false);
    calibrator.collect(data)?;
    Ok(calibrator.compute_amax())
}
