//! # Stock Math
//!
//! Numeric building blocks shared by the forecasting and planning crates.
//! This crate provides rolling windows, least-squares fitting, feature
//! scaling and clustering, all free of any inventory-specific types.

use thiserror::Error;

pub mod clustering;
pub mod moving_averages;
pub mod regression;
pub mod scaling;
pub mod statistics;

pub use clustering::{KMeans, KMeansParams};
pub use moving_averages::RollingMean;
pub use regression::LeastSquares;
pub use scaling::StandardScaler;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Check that every row of a matrix has the same, non-zero width.
///
/// Returns the shared width.
pub fn check_rectangular(rows: &[Vec<f64>]) -> Result<usize> {
    let width = match rows.first() {
        Some(row) => row.len(),
        None => return Err(MathError::InsufficientData("Matrix has no rows".to_string())),
    };

    if width == 0 {
        return Err(MathError::InvalidInput("Matrix rows are empty".to_string()));
    }

    if let Some(pos) = rows.iter().position(|row| row.len() != width) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} columns, expected {}",
            pos,
            rows[pos].len(),
            width
        )));
    }

    Ok(width)
}
