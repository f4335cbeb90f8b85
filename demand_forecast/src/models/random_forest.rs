//! Bagged regression-tree forest
//!
//! Each tree is grown on a bootstrap sample drawn from an RNG seeded with
//! `seed + tree_index`, so training is repeatable for a fixed seed and
//! observation set.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, Observation, N_FEATURES};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{design_matrix, DemandModel, TrainedDemandModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(12),
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForest {
    /// Name of the model
    name: String,
    params: RandomForestParams,
}

/// Trained random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedRandomForest {
    name: String,
    params: RandomForestParams,
    trees: Vec<RegressionTree>,
    /// Normalised squared-error reduction per feature
    feature_importance: Vec<f64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(params: RandomForestParams) -> Result<Self> {
        if params.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if params.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if params.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Random Forest (trees={}, seed={})",
                params.n_estimators, params.seed
            ),
            params,
        })
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }
}

impl DemandModel for RandomForest {
    type Trained = TrainedRandomForest;

    fn train(&self, observations: &[Observation]) -> Result<Self::Trained> {
        let (x, y) = design_matrix(observations)?;
        let n = x.len();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
        };

        let mut importance = vec![0.0; N_FEATURES];
        let trees: Vec<RegressionTree> = (0..self.params.n_estimators)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(&x, &y, sample, tree_params, &mut importance)
            })
            .collect();

        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            importance.iter_mut().for_each(|v| *v /= total);
        }

        debug!(
            trees = trees.len(),
            nodes = trees.iter().map(RegressionTree::n_nodes).sum::<usize>(),
            "random forest grown"
        );

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            params: self.params,
            trees,
            feature_importance: importance,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedRandomForest {
    /// Importance per feature, in feature order, summing to 1 (or all zero)
    pub fn feature_importance(&self) -> &[f64] {
        &self.feature_importance
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    /// Structural check used after deserialisation
    pub fn is_well_formed(&self) -> bool {
        !self.trees.is_empty()
            && self.feature_importance.len() == N_FEATURES
            && self.trees.iter().all(|t| t.is_well_formed(N_FEATURES))
    }
}

impl TrainedDemandModel for TrainedRandomForest {
    fn predict_raw(&self, features: &FeatureVector) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ForecastError::ValidationError(
                "Random forest has no trees".to_string(),
            ));
        }
        let row = features.as_slice();
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
