//! Z-score feature scaling

use crate::statistics::{column, mean, population_std_dev};
use crate::{check_rectangular, MathError, Result};
use serde::{Deserialize, Serialize};

/// Column-wise z-score scaler.
///
/// Stores the mean and population standard deviation of every column seen
/// by [`StandardScaler::fit`]. Constant columns get a scale of 1 so they map
/// to zero instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Compute column statistics from a row-major matrix
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = check_rectangular(rows)?;

        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);

        for index in 0..width {
            let values = column(rows, index);
            if values.iter().any(|v| !v.is_finite()) {
                return Err(MathError::InvalidInput(format!(
                    "Column {} contains non-finite values",
                    index
                )));
            }

            let std_dev = population_std_dev(&values)?;
            means.push(mean(&values)?);
            scales.push(if std_dev > f64::EPSILON { std_dev } else { 1.0 });
        }

        Ok(Self { means, scales })
    }

    /// Scale rows with the fitted statistics
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let width = check_rectangular(rows)?;
        if width != self.means.len() {
            return Err(MathError::InvalidInput(format!(
                "Scaler was fitted on {} columns, got {}",
                self.means.len(),
                width
            )));
        }

        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(value, (mean, scale))| (value - mean) / scale)
                    .collect()
            })
            .collect())
    }

    /// Fit on `rows` and scale them in one pass
    pub fn fit_transform(rows: &[Vec<f64>]) -> Result<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}
