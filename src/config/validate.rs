//! Quantization spec validation

use super::schema::QuantSpec;
use crate::error::{QuantError, Result};
use crate::quant::QuantProfile;
use std::collections::HashSet;

/// Validate a quantization spec
///
/// Checks:
/// - Bit width is 4 or 8
/// - At least one layer, with unique non-empty names
/// - Layer dimensions are positive
/// - Calibration settings are in range
pub fn validate_spec(spec: &QuantSpec) -> Result<()> {
    QuantProfile::from_bits(spec.bits)?;
    spec.calibration.validate()?;

    if spec.layers.is_empty() {
        return Err(QuantError::InvalidSpec("no layers defined".to_string()));
    }

    let mut seen = HashSet::new();
    for layer in &spec.layers {
        if layer.name.trim().is_empty() {
            return Err(QuantError::InvalidSpec("layer name is empty".to_string()));
        }
        if !seen.insert(layer.name.as_str()) {
            return Err(QuantError::InvalidSpec(format!(
                "duplicate layer name '{}'",
                layer.name
            )));
        }
        if layer.in_features == 0 || layer.out_features == 0 {
            return Err(QuantError::InvalidSpec(format!(
                "layer '{}' has a zero dimension ({} -> {})",
                layer.name, layer.in_features, layer.out_features
            )));
        }
    }

    Ok(())
}
