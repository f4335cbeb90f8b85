//! Parameter and input validation helpers

use crate::{PlanningError, Result};

/// Validate a configuration value is positive
pub fn validate_positive(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlanningError::InvalidParameter(format!(
            "{} must be positive",
            name
        )));
    }
    Ok(())
}

/// Validate a configuration value is within a range
pub fn validate_range(value: f64, min: f64, max: f64, name: &str) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(PlanningError::InvalidParameter(format!(
            "{} must be between {} and {}",
            name, min, max
        )));
    }
    Ok(())
}

/// Validate an input quantity is finite and not negative
pub fn check_quantity(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanningError::DataError(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate every entry of a forecast
pub fn check_forecast(values: &[f64], name: &str) -> Result<()> {
    values
        .iter()
        .try_for_each(|&value| check_quantity(value, name))
}
