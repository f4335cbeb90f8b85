//! Multivariate least-squares regression
//!
//! Fits `y = intercept + Σ coefficient_j · x_j` by solving the (optionally
//! ridge-regularised) normal equations on centred data. The intercept is
//! never penalised.

use crate::statistics::{column, mean};
use crate::{check_rectangular, MathError, Result};
use serde::{Deserialize, Serialize};

/// Pivot magnitude below which the system is treated as singular
const SINGULAR_PIVOT: f64 = 1e-12;

/// Fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeastSquares {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LeastSquares {
    /// Fit coefficients to the rows of `x` against targets `y`.
    ///
    /// `ridge` adds `ridge · I` to the centred Gram matrix; a small positive
    /// value keeps constant or collinear columns solvable.
    pub fn fit(x: &[Vec<f64>], y: &[f64], ridge: f64) -> Result<Self> {
        let width = check_rectangular(x)?;
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if ridge < 0.0 || !ridge.is_finite() {
            return Err(MathError::InvalidInput(
                "Ridge penalty must be a non-negative finite number".to_string(),
            ));
        }

        let x_means: Vec<f64> = (0..width)
            .map(|j| mean(&column(x, j)))
            .collect::<Result<_>>()?;
        let y_mean = mean(y)?;

        // Gram matrix and moment vector of the centred data
        let mut gram = vec![vec![0.0; width]; width];
        let mut moments = vec![0.0; width];
        for (row, &target) in x.iter().zip(y) {
            let centred: Vec<f64> = row.iter().zip(&x_means).map(|(v, m)| v - m).collect();
            let dy = target - y_mean;
            for i in 0..width {
                moments[i] += centred[i] * dy;
                for j in i..width {
                    gram[i][j] += centred[i] * centred[j];
                }
            }
        }
        for i in 0..width {
            gram[i][i] += ridge;
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
        }

        let coefficients = solve(gram, moments)?;
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_means)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Predict the target for one feature row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, v)| b * v)
                .sum::<f64>())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);

        if a[pivot][col].abs() < SINGULAR_PIVOT {
            return Err(MathError::CalculationError(format!(
                "Normal equations are singular at column {}",
                col
            )));
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}
