//! K-means clustering with seeded k-means++ initialisation
//!
//! Every run is driven by a `StdRng` seeded from [`KMeansParams::seed`], so
//! the same points and parameters always yield the same clusters.

use crate::statistics::squared_distance;
use crate::{check_rectangular, MathError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Parameters for a k-means fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Number of clusters
    pub n_clusters: usize,
    /// Maximum Lloyd iterations per run
    pub max_iter: usize,
    /// Number of independently initialised runs; the lowest inertia wins
    pub n_init: usize,
    /// Stop when the summed squared centroid shift falls below this
    pub tolerance: f64,
    /// Seed for the initialisation RNG
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            max_iter: 300,
            n_init: 10,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

impl KMeansParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(MathError::InvalidInput(
                "Cluster count must be greater than zero".to_string(),
            ));
        }
        if self.max_iter == 0 || self.n_init == 0 {
            return Err(MathError::InvalidInput(
                "max_iter and n_init must be greater than zero".to_string(),
            ));
        }
        if self.tolerance < 0.0 || !self.tolerance.is_finite() {
            return Err(MathError::InvalidInput(
                "Tolerance must be a non-negative finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// A fitted k-means model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeans {
    params: KMeansParams,
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    inertia: f64,
    n_iter: usize,
}

impl KMeans {
    /// Cluster `points` into `params.n_clusters` groups.
    ///
    /// Labels are renumbered by first appearance, so the cluster holding
    /// `points[0]` is always cluster 0.
    pub fn fit(points: &[Vec<f64>], params: KMeansParams) -> Result<Self> {
        params.validate()?;
        check_rectangular(points)?;

        if points.len() < params.n_clusters {
            return Err(MathError::InsufficientData(format!(
                "Need at least {} points for {} clusters, got {}",
                params.n_clusters,
                params.n_clusters,
                points.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut best: Option<Run> = None;

        for _ in 0..params.n_init {
            let run = lloyd(points, &params, &mut rng);
            let better = match &best {
                Some(current) => run.inertia < current.inertia,
                None => true,
            };
            if better {
                best = Some(run);
            }
        }

        let run = best.ok_or_else(|| {
            MathError::CalculationError("k-means produced no runs".to_string())
        })?;

        Ok(Self::relabelled(params, run))
    }

    /// Index of the nearest centroid for a point
    pub fn predict(&self, point: &[f64]) -> Result<usize> {
        let width = self.centroids.first().map(Vec::len).unwrap_or(0);
        if point.len() != width {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, got {}",
                width,
                point.len()
            )));
        }
        Ok(nearest(&self.centroids, point).0)
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Sum of squared distances from each point to its centroid
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn params(&self) -> &KMeansParams {
        &self.params
    }

    fn relabelled(params: KMeansParams, run: Run) -> Self {
        let mut mapping: Vec<Option<usize>> = vec![None; run.centroids.len()];
        let mut next = 0;
        for &label in &run.labels {
            if mapping[label].is_none() {
                mapping[label] = Some(next);
                next += 1;
            }
        }
        // Centroids that own no point go last, in their original order
        for slot in mapping.iter_mut() {
            if slot.is_none() {
                *slot = Some(next);
                next += 1;
            }
        }

        let mapping: Vec<usize> = mapping.into_iter().map(|m| m.unwrap_or(0)).collect();
        let mut centroids = vec![Vec::new(); run.centroids.len()];
        for (old, centroid) in run.centroids.into_iter().enumerate() {
            centroids[mapping[old]] = centroid;
        }
        let labels = run.labels.iter().map(|&l| mapping[l]).collect();

        Self {
            params,
            centroids,
            labels,
            inertia: run.inertia,
            n_iter: run.n_iter,
        }
    }
}

struct Run {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    inertia: f64,
    n_iter: usize,
}

fn lloyd(points: &[Vec<f64>], params: &KMeansParams, rng: &mut StdRng) -> Run {
    let mut centroids = init_plus_plus(points, params.n_clusters, rng);
    let mut labels = vec![0; points.len()];
    let mut n_iter = 0;

    for _ in 0..params.max_iter {
        n_iter += 1;

        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(&centroids, point).0;
        }

        let updated = recompute(points, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centroids = updated;

        if shift <= params.tolerance {
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (index, distance) = nearest(&centroids, point);
        *label = index;
        inertia += distance;
    }

    Run {
        centroids,
        labels,
        inertia,
        n_iter,
    }
}

fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(&centroids, p).1).collect();
        let total: f64 = weights.iter().sum();

        let index = if total <= 0.0 {
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        };

        centroids.push(points[index].clone());
    }

    centroids
}

fn recompute(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let width = previous[0].len();
    let mut sums = vec![vec![0.0; width]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (acc, value) in sums[label].iter_mut().zip(point) {
            *acc += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), old)| {
            if count == 0 {
                // Empty cluster keeps its centroid
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(centroid, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.2, 0.1],
            vec![10.1, 9.9],
            vec![-0.1, 0.2],
            vec![9.8, 10.2],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let params = KMeansParams {
            n_clusters: 2,
            ..KMeansParams::default()
        };
        let model = KMeans::fit(&blobs(), params).unwrap();

        assert_eq!(model.labels(), &[0, 1, 0, 1, 0, 1]);
        assert_eq!(model.predict(&[0.5, 0.5]).unwrap(), 0);
        assert_eq!(model.predict(&[9.0, 9.0]).unwrap(), 1);
        assert!(model.inertia() < 1.0);
    }

    #[test]
    fn test_deterministic_under_seed() {
        let params = KMeansParams {
            n_clusters: 3,
            ..KMeansParams::default()
        };
        let a = KMeans::fit(&blobs(), params).unwrap();
        let b = KMeans::fit(&blobs(), params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_points() {
        let params = KMeansParams::default();
        assert!(KMeans::fit(&[vec![1.0], vec![2.0]], params).is_err());
    }

    #[test]
    fn test_single_cluster_groups_everything() {
        let params = KMeansParams {
            n_clusters: 1,
            ..KMeansParams::default()
        };
        let model = KMeans::fit(&blobs(), params).unwrap();
        assert!(model.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_invalid_params() {
        let params = KMeansParams {
            n_clusters: 0,
            ..KMeansParams::default()
        };
        assert!(params.validate().is_err());
    }
}
