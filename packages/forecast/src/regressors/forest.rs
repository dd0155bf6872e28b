//! Bagged ensemble of regression trees.
//!
//! Each tree is grown on a bootstrap sample of the training set, splitting
//! on the single feature at the midpoint between adjacent distinct values
//! that minimizes the summed squared error of both children. Trees grow
//! until a node holds one sample, identical targets, or identical features.
//! Thresholds at midpoints make the partition depend only on the order of
//! the feature values, so any increasing affine rescaling of the feature
//! yields the same predictions.

use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;

use super::{Regressor, check_training_set, mean};
use crate::ForecastError;

/// Default number of trees.
pub const DEFAULT_TREES: usize = 100;
/// Default RNG seed. Fixed so repeated fits give identical forecasts.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        threshold: f64,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl Node {
    fn predict(&self, x: f64) -> f64 {
        match self {
            Self::Leaf(value) => *value,
            Self::Split {
                threshold,
                left,
                right,
            } => {
                if x <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Grows a tree over `samples`, which must be sorted by feature.
fn grow(samples: &[(f64, f64)]) -> Node {
    let targets: Vec<f64> = samples.iter().map(|s| s.1).collect();
    let leaf_value = mean(&targets);

    let Some(split_at) = best_split(samples) else {
        return Node::Leaf(leaf_value);
    };

    let threshold = 0.5 * (samples[split_at - 1].0 + samples[split_at].0);
    let (left, right) = samples.split_at(split_at);

    Node::Split {
        threshold,
        left: Box::new(grow(left)),
        right: Box::new(grow(right)),
    }
}

/// Index of the first sample of the right child for the best split, or
/// `None` if the node should be a leaf.
fn best_split(samples: &[(f64, f64)]) -> Option<usize> {
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let first = samples[0].1;
    if samples.iter().all(|s| (s.1 - first).abs() <= f64::EPSILON * first.abs()) {
        return None;
    }

    let total: f64 = samples.iter().map(|s| s.1).sum();
    let total_sq: f64 = samples.iter().map(|s| s.1 * s.1).sum();

    let mut best: Option<(usize, f64)> = None;
    let mut left_sum = 0.0;
    let mut left_sq = 0.0;

    for i in 1..n {
        let y = samples[i - 1].1;
        left_sum += y;
        left_sq += y * y;

        // Only split between distinct feature values.
        if samples[i].0 <= samples[i - 1].0 {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let (nl, nr) = (i as f64, (n - i) as f64);
        let right_sum = total - left_sum;
        let right_sq = total_sq - left_sq;
        let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);

        if best.is_none_or(|(_, b)| sse < b) {
            best = Some((i, sse));
        }
    }

    best.map(|(i, _)| i)
}

/// Random forest of regression trees with a fixed seed.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: usize,
    seed: u64,
    fitted: Option<Vec<Node>>,
}

impl RandomForest {
    #[must_use]
    pub fn new(trees: usize, seed: u64) -> Self {
        Self {
            trees: trees.max(1),
            seed,
            fitted: None,
        }
    }

    /// Depth of the deepest fitted tree.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.fitted
            .as_ref()
            .and_then(|trees| trees.iter().map(Node::depth).max())
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(DEFAULT_TREES, DEFAULT_SEED)
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError> {
        check_training_set(features, targets)?;

        let n = features.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let trees = (0..self.trees)
            .map(|_| {
                let mut sample: Vec<(f64, f64)> = (0..n)
                    .map(|_| {
                        let i = rng.random_range(0..n);
                        (features[i], targets[i])
                    })
                    .collect();
                sample.sort_by(|a, b| a.0.total_cmp(&b.0));
                grow(&sample)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Random forest fit: {} trees on {n} samples, max depth {}",
            trees.len(),
            trees.iter().map(Node::depth).max().unwrap_or(0)
        );

        self.fitted = Some(trees);
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let trees = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        Ok(features
            .iter()
            .map(|&x| {
                let votes: Vec<f64> = trees.iter().map(|t| t.predict(x)).collect();
                mean(&votes)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tree_fits_training_points_exactly() {
        let samples = [(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)];
        let tree = grow(&samples);
        for (x, y) in samples {
            assert!((tree.predict(x) - y).abs() < 1e-12);
        }
    }

    #[test]
    fn duplicate_features_become_one_leaf() {
        let samples = [(1.0, 2.0), (1.0, 4.0)];
        assert!(best_split(&samples).is_none());
        let tree = grow(&samples);
        assert!((tree.predict(1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn splits_where_error_drops_most() {
        let samples = [(0.0, 0.0), (1.0, 0.0), (2.0, 10.0), (3.0, 10.0)];
        assert_eq!(best_split(&samples), Some(2));
    }

    #[test]
    fn same_seed_same_forest() {
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let ys = [3.0, 8.0, 1.0, 9.0, 4.0, 7.0, 2.0, 6.0, 5.0, 0.0];

        let mut a = RandomForest::default();
        let mut b = RandomForest::default();
        a.fit(&xs, &ys).unwrap();
        b.fit(&xs, &ys).unwrap();

        let query = [-1.0, 2.5, 4.0, 12.0];
        assert_eq!(a.predict(&query).unwrap(), b.predict(&query).unwrap());
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let mut forest = RandomForest::default();
        forest.fit(&xs, &ys).unwrap();

        for p in forest.predict(&[-5.0, 0.5, 4.5, 50.0]).unwrap() {
            assert!((0.0..=81.0).contains(&p));
        }
        assert!(forest.max_depth().unwrap() >= 1);
    }
}
