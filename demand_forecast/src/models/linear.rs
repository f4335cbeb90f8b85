//! Ordinary least-squares demand model

use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, Observation, N_FEATURES};
use crate::models::{design_matrix, DemandModel, TrainedDemandModel};
use serde::{Deserialize, Serialize};
use stock_math::LeastSquares;

/// Linear regression on the full feature vector
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Name of the model
    name: String,
    /// Ridge penalty keeping constant columns solvable
    ridge: f64,
}

/// Trained linear regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLinearRegression {
    name: String,
    fit: LeastSquares,
}

impl LinearRegression {
    /// Create a new linear model
    pub fn new(ridge: f64) -> Result<Self> {
        if ridge < 0.0 || !ridge.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Ridge penalty must be a non-negative finite number".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Linear Regression (ridge={})", ridge),
            ridge,
        })
    }
}

impl DemandModel for LinearRegression {
    type Trained = TrainedLinearRegression;

    fn train(&self, observations: &[Observation]) -> Result<Self::Trained> {
        let (x, y) = design_matrix(observations)?;
        let fit = LeastSquares::fit(&x, &y, self.ridge)?;

        Ok(TrainedLinearRegression {
            name: self.name.clone(),
            fit,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLinearRegression {
    pub fn coefficients(&self) -> &[f64] {
        self.fit.coefficients()
    }

    pub fn intercept(&self) -> f64 {
        self.fit.intercept()
    }

    /// One finite coefficient per feature and a finite intercept
    pub fn is_well_formed(&self) -> bool {
        self.coefficients().len() == N_FEATURES
            && self.coefficients().iter().all(|c| c.is_finite())
            && self.intercept().is_finite()
    }
}

impl TrainedDemandModel for TrainedLinearRegression {
    fn predict_raw(&self, features: &FeatureVector) -> Result<f64> {
        Ok(self.fit.predict(features.as_slice())?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
