//! Metrics for evaluating demand model fit

use crate::error::{ForecastError, Result};
use crate::features::Observation;
use crate::models::TrainedDemandModel;
use serde::{Deserialize, Serialize};
use stock_math::statistics::mean;

/// Error metrics for predicted vs actual demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination; 0 when the actuals are constant
    pub r2: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
}

impl RegressionMetrics {
    /// Compare predictions with actual values
    pub fn evaluate(predicted: &[f64], actual: &[f64]) -> Result<Self> {
        if predicted.len() != actual.len() || predicted.is_empty() {
            return Err(ForecastError::ValidationError(
                "Predicted and actual values must have the same non-zero length".to_string(),
            ));
        }

        let n = predicted.len() as f64;
        let errors: Vec<f64> = predicted
            .iter()
            .zip(actual)
            .map(|(&p, &a)| a - p)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

        let actual_mean = mean(actual)?;
        let ss_total: f64 = actual.iter().map(|a| (a - actual_mean).powi(2)).sum();
        let ss_residual: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let r2 = if ss_total > 0.0 {
            1.0 - ss_residual / ss_total
        } else {
            0.0
        };

        let nonzero: Vec<(f64, f64)> = actual
            .iter()
            .zip(&errors)
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| (a, e))
            .collect();
        let mape = if nonzero.is_empty() {
            0.0
        } else {
            nonzero
                .iter()
                .map(|(a, e)| e.abs() / a.abs() * 100.0)
                .sum::<f64>()
                / nonzero.len() as f64
        };

        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            r2,
            mape,
        })
    }
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Regression Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  R2:    {:.4}", self.r2)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}

/// Accuracy ratio `1 - mae / mean_actual`.
///
/// Not clamped: a model worse than the naive mean predictor scores below 0.
pub fn accuracy_ratio(mae: f64, mean_actual: f64) -> Result<f64> {
    if mean_actual <= 0.0 || !mean_actual.is_finite() {
        return Err(ForecastError::DataError(format!(
            "Accuracy is undefined for mean actual sales of {}",
            mean_actual
        )));
    }
    Ok(1.0 - mae / mean_actual)
}

/// Outcome of one training run, scored on the training set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_name: String,
    pub n_observations: usize,
    pub accuracy: f64,
    pub metrics: RegressionMetrics,
}

impl TrainingReport {
    /// Score a trained model against labelled observations
    pub fn evaluate<M: TrainedDemandModel>(model: &M, observations: &[Observation]) -> Result<Self> {
        let actual = observations
            .iter()
            .map(Observation::label)
            .collect::<Result<Vec<_>>>()?;
        let predicted = model.predict_all(observations)?;
        let metrics = RegressionMetrics::evaluate(&predicted, &actual)?;
        let accuracy = accuracy_ratio(metrics.mae, mean(&actual)?)?;

        Ok(Self {
            model_name: model.name().to_string(),
            n_observations: observations.len(),
            accuracy,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_metrics_values() {
        let metrics = RegressionMetrics::evaluate(&[2.0, 4.0, 6.0], &[3.0, 4.0, 8.0]).unwrap();
        assert_relative_eq!(metrics.mae, 1.0);
        assert_relative_eq!(metrics.mse, 5.0 / 3.0);
        assert_relative_eq!(metrics.rmse, (5.0f64 / 3.0).sqrt());
        assert!(metrics.r2 > 0.0 && metrics.r2 < 1.0);
    }

    #[test]
    fn test_accuracy_can_be_negative() {
        assert_relative_eq!(accuracy_ratio(1.0, 5.0).unwrap(), 0.8);
        assert_relative_eq!(accuracy_ratio(10.0, 5.0).unwrap(), -1.0);
        assert!(accuracy_ratio(1.0, 0.0).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(RegressionMetrics::evaluate(&[1.0], &[1.0, 2.0]).is_err());
        assert!(RegressionMetrics::evaluate(&[], &[]).is_err());
    }
}
