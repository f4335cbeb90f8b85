//! Demand regression models
//!
//! A [`DemandModel`] is an untrained model description. Training returns a
//! separate, immutable [`TrainedDemandModel`] handle; there is no way to
//! call `predict` on something that has not been trained.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, Observation, FEATURE_NAMES, N_FEATURES};
use crate::metrics::TrainingReport;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::info;

pub mod linear;
pub mod random_forest;
mod tree;

pub use linear::{LinearRegression, TrainedLinearRegression};
pub use random_forest::{RandomForest, RandomForestParams, TrainedRandomForest};

/// Trained demand model
pub trait TrainedDemandModel: Debug {
    /// Unclamped model output for one feature vector
    fn predict_raw(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;

    /// Predicted demand, clamped at zero
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        Ok(self.predict_raw(features)?.max(0.0))
    }

    /// Clamped predictions for a batch of observations
    fn predict_all(&self, observations: &[Observation]) -> Result<Vec<f64>> {
        observations
            .iter()
            .map(|obs| self.predict(&obs.features()))
            .collect()
    }
}

/// Demand model that can be trained on labelled observations
pub trait DemandModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedDemandModel;

    /// Fit the model to `observations`, whose labels must all be present
    fn train(&self, observations: &[Observation]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Split observations into a feature matrix and label vector
pub(crate) fn design_matrix(observations: &[Observation]) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    if observations.is_empty() {
        return Err(ForecastError::DataError(
            "Cannot train on an empty observation set".to_string(),
        ));
    }

    let mut x = Vec::with_capacity(observations.len());
    let mut y = Vec::with_capacity(observations.len());
    for obs in observations {
        y.push(obs.label()?);
        x.push(obs.features().0.to_vec());
    }
    Ok((x, y))
}

/// Which regressor to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    RandomForest,
    Linear,
}

/// Settings for the demand regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Ridge penalty for the linear model
    pub ridge: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::RandomForest,
            n_estimators: 100,
            max_depth: Some(12),
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
            ridge: 1e-6,
        }
    }
}

/// The configured regressor, before training
#[derive(Debug, Clone)]
pub enum DemandForecaster {
    RandomForest(RandomForest),
    Linear(LinearRegression),
}

impl DemandForecaster {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Ok(match config.kind {
            ModelKind::RandomForest => Self::RandomForest(RandomForest::new(RandomForestParams {
                n_estimators: config.n_estimators,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                seed: config.seed,
            })?),
            ModelKind::Linear => Self::Linear(LinearRegression::new(config.ridge)?),
        })
    }

    /// Train and score against the training set.
    ///
    /// The returned accuracy is `1 - MAE / mean(actual)` and is negative when
    /// the fit is worse than predicting the mean.
    pub fn fit(&self, observations: &[Observation]) -> Result<(TrainedForecaster, TrainingReport)> {
        let trained = self.train(observations)?;
        let report = TrainingReport::evaluate(&trained, observations)?;
        info!(
            model = trained.name(),
            observations = observations.len(),
            accuracy = report.accuracy,
            "demand model trained"
        );
        Ok((trained, report))
    }
}

impl DemandModel for DemandForecaster {
    type Trained = TrainedForecaster;

    fn train(&self, observations: &[Observation]) -> Result<Self::Trained> {
        Ok(match self {
            Self::RandomForest(model) => TrainedForecaster::RandomForest(model.train(observations)?),
            Self::Linear(model) => TrainedForecaster::Linear(model.train(observations)?),
        })
    }

    fn name(&self) -> &str {
        match self {
            Self::RandomForest(model) => model.name(),
            Self::Linear(model) => model.name(),
        }
    }
}

/// A trained regressor of any supported kind; this is the persisted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedForecaster {
    RandomForest(TrainedRandomForest),
    Linear(TrainedLinearRegression),
}

impl TrainedForecaster {
    /// Per-feature importances, when the model provides them
    pub fn feature_importance(&self) -> Option<Vec<(&'static str, f64)>> {
        match self {
            Self::RandomForest(model) => Some(
                FEATURE_NAMES
                    .iter()
                    .copied()
                    .zip(model.feature_importance().iter().copied())
                    .collect(),
            ),
            Self::Linear(_) => None,
        }
    }

    /// Check the structure of a model read back from storage
    pub fn validate(&self) -> Result<()> {
        let well_formed = match self {
            Self::RandomForest(model) => model.is_well_formed(),
            Self::Linear(model) => model.is_well_formed(),
        };
        if well_formed {
            Ok(())
        } else {
            Err(ForecastError::ValidationError(format!(
                "{} is malformed for {} features",
                self.name(),
                N_FEATURES
            )))
        }
    }
}

impl TrainedDemandModel for TrainedForecaster {
    fn predict_raw(&self, features: &FeatureVector) -> Result<f64> {
        match self {
            Self::RandomForest(model) => model.predict_raw(features),
            Self::Linear(model) => model.predict_raw(features),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::RandomForest(model) => model.name(),
            Self::Linear(model) => model.name(),
        }
    }
}
