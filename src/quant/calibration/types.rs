//! Type definitions for amax calibration

use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of histogram bins used by percentile calibration
pub const DEFAULT_NUM_BINS: usize = 2048;

/// How a calibrator turns observed data into an amax
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CalibMethod {
    /// Largest absolute value seen
    #[default]
    Max,
    /// Percentile of the absolute-value histogram (robust to outliers)
    Percentile {
        /// Upper percentile, e.g. 99.99
        percentile: f32,
    },
}

impl CalibMethod {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Max => Ok(()),
            Self::Percentile { percentile } => {
                if percentile > 0.0 && percentile <= 100.0 {
                    Ok(())
                } else {
                    Err(QuantError::InvalidPercentile(percentile))
                }
            }
        }
    }
}

impl fmt::Display for CalibMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Percentile { percentile } => write!(f, "percentile({percentile})"),
        }
    }
}
