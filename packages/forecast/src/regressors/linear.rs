//! Ordinary least squares on a single feature.

use super::{Regressor, check_training_set, mean};
use crate::ForecastError;

/// Least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<(f64, f64)>,
}

impl LinearRegression {
    /// Fitted `(intercept, slope)`, if the model has been fitted.
    #[must_use]
    pub const fn coefficients(&self) -> Option<(f64, f64)> {
        self.coefficients
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError> {
        check_training_set(features, targets)?;

        let mean_x = mean(features);
        let mean_y = mean(targets);

        let (sxx, sxy) = features
            .iter()
            .zip(targets)
            .fold((0.0, 0.0), |(sxx, sxy), (&x, &y)| {
                let dx = x - mean_x;
                (dx.mul_add(dx, sxx), dx.mul_add(y - mean_y, sxy))
            });

        // A single distinct x has no defined slope; the minimum-norm
        // solution is the flat line through the mean.
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = slope.mul_add(-mean_x, mean_y);

        log::debug!("Linear fit: intercept={intercept} slope={slope}");
        self.coefficients = Some((intercept, slope));
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let (intercept, slope) = self.coefficients.ok_or(ForecastError::NotFitted)?;
        Ok(features.iter().map(|&x| slope.mul_add(x, intercept)).collect())
    }
}
