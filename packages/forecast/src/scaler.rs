//! Standardization of the year feature.

use crime_trends_forecast_models::FeatureScaling;

/// Affine transform `(x - mean) / scale` fitted on the training features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            mean: 0.0,
            scale: 1.0,
        }
    }

    /// Fits the scaler on `values` using the population standard deviation.
    ///
    /// A zero (or undefined) deviation falls back to a scale of 1 so the
    /// transform stays finite.
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::identity();
        }

        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            mean,
            scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        }
    }

    /// Builds the transform requested by `scaling` for the given history.
    #[must_use]
    pub fn for_scaling(scaling: FeatureScaling, history: &[f64]) -> Self {
        match scaling {
            FeatureScaling::Standard => Self::fit(history),
            FeatureScaling::None => Self::identity(),
        }
    }

    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    #[must_use]
    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    #[must_use]
    pub fn inverse_transform(&self, value: f64) -> f64 {
        value.mul_add(self.scale, self.mean)
    }

    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }
}
