//! Uniform-weight k-nearest-neighbors regression.

use super::{Regressor, check_training_set, mean};
use crate::ForecastError;

/// Default neighbor count.
pub const DEFAULT_NEIGHBORS: usize = 5;

/// Predicts the mean target of the `k` training samples closest to the
/// query feature.
///
/// When fewer than `k` samples are available, every sample is used.
/// Equidistant neighbors are taken in training order.
#[derive(Debug, Clone)]
pub struct KNearestNeighbors {
    neighbors: usize,
    samples: Option<Vec<(f64, f64)>>,
}

impl KNearestNeighbors {
    /// Creates a model averaging `neighbors` samples (at least one).
    #[must_use]
    pub fn new(neighbors: usize) -> Self {
        Self {
            neighbors: neighbors.max(1),
            samples: None,
        }
    }

    /// Neighbor count actually used after fitting, clamped to the number of
    /// training samples.
    #[must_use]
    pub fn effective_neighbors(&self) -> Option<usize> {
        self.samples
            .as_ref()
            .map(|samples| self.neighbors.min(samples.len()))
    }

    fn predict_one(&self, samples: &[(f64, f64)], query: f64) -> f64 {
        let mut order: Vec<usize> = (0..samples.len()).collect();
        // Stable sort keeps training order among equal distances.
        order.sort_by(|&a, &b| {
            let da = (samples[a].0 - query).abs();
            let db = (samples[b].0 - query).abs();
            da.total_cmp(&db)
        });

        let k = self.neighbors.min(samples.len());
        let nearest: Vec<f64> = order[..k].iter().map(|&i| samples[i].1).collect();
        mean(&nearest)
    }
}

impl Default for KNearestNeighbors {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORS)
    }
}

impl Regressor for KNearestNeighbors {
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError> {
        check_training_set(features, targets)?;

        if features.len() < self.neighbors {
            log::debug!(
                "KNN: clamping k from {} to {} training samples",
                self.neighbors,
                features.len()
            );
        }

        self.samples = Some(
            features
                .iter()
                .copied()
                .zip(targets.iter().copied())
                .collect(),
        );
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let samples = self.samples.as_deref().ok_or(ForecastError::NotFitted)?;
        Ok(features
            .iter()
            .map(|&query| self.predict_one(samples, query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_nearest_five() {
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let ys: Vec<f64> = (0..10).map(|i| f64::from(i) * 10.0).collect();
        let mut model = KNearestNeighbors::default();
        model.fit(&xs, &ys).unwrap();

        // Beyond the last sample the five nearest are x = 5..=9.
        let predicted = model.predict(&[20.0]).unwrap();
        assert!((predicted[0] - 70.0).abs() < 1e-12);
        assert_eq!(model.effective_neighbors(), Some(5));
    }

    #[test]
    fn clamps_k_to_sample_count() {
        let mut model = KNearestNeighbors::default();
        model.fit(&[0.0, 1.0, 2.0], &[3.0, 6.0, 9.0]).unwrap();
        assert_eq!(model.effective_neighbors(), Some(3));

        let predicted = model.predict(&[100.0]).unwrap();
        assert!((predicted[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn equidistant_neighbors_follow_training_order() {
        let mut model = KNearestNeighbors::new(1);
        model.fit(&[-1.0, 1.0], &[10.0, 20.0]).unwrap();
        let predicted = model.predict(&[0.0]).unwrap();
        assert!((predicted[0] - 10.0).abs() < 1e-12);
    }
}
