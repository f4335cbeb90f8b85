//! CART regression tree used by the random forest

use serde::{Deserialize, Serialize};

/// Node SSE below which a node is considered pure
const PURE_SSE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// A fitted regression tree, stored as a flat node array rooted at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    child_sse: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` selected by `samples`.
    ///
    /// Squared-error reduction of every split is added to `importance`.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        samples: Vec<usize>,
        params: TreeParams,
        importance: &mut [f64],
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, samples, 0, params, importance);
        tree
    }

    pub(crate) fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Check that every child index points inside the node array
    pub(crate) fn is_well_formed(&self, n_features: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(i, node)| match node {
                Node::Leaf { value } => value.is_finite(),
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    *feature < n_features
                        && *left > i
                        && *right > i
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        samples: Vec<usize>,
        depth: usize,
        params: TreeParams,
        importance: &mut [f64],
    ) -> usize {
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().map(|&i| y[i]).sum();
        let sum_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();
        let mean = sum / n;
        let sse = sum_sq - sum * sum / n;

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = params.max_depth.map_or(false, |max| depth >= max);
        if depth_reached || samples.len() < params.min_samples_split || sse <= PURE_SSE {
            return index;
        }

        let best = match best_split(x, y, &samples, params.min_samples_leaf) {
            Some(best) if best.child_sse < sse => best,
            _ => return index,
        };

        importance[best.feature] += sse - best.child_sse;

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| x[i][best.feature] <= best.threshold);

        let left = self.grow(x, y, left_samples, depth + 1, params, importance);
        let right = self.grow(x, y, right_samples, depth + 1, params, importance);

        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }
}

fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    samples: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let width = x[samples[0]].len();
    let n = samples.len();
    let total: f64 = samples.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();
    let min_leaf = min_samples_leaf.max(1);

    let mut best: Option<SplitCandidate> = None;
    let mut order = samples.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let moved = y[order[k - 1]];
            left_sum += moved;
            left_sq += moved * moved;

            let lower = x[order[k - 1]][feature];
            let upper = x[order[k]][feature];
            if lower >= upper || k < min_leaf || n - k < min_leaf {
                continue;
            }

            let left_n = k as f64;
            let right_n = (n - k) as f64;
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let child_sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().map_or(true, |b| child_sse < b.child_sse) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: lower + (upper - lower) / 2.0,
                    child_sse,
                });
            }
        }
    }

    best
}
