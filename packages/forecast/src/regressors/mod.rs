//! Interchangeable single-feature regression strategies.
//!
//! Every strategy implements [`Regressor`]. [`Estimator`] is the closed set
//! of strategies a [`ModelKind`] can select; the forecast engine is generic
//! over [`Regressor`] and never branches on the model kind itself.

pub mod forest;
pub mod knn;
pub mod linear;
pub mod svr;

use crime_trends_forecast_models::ModelKind;

pub use forest::RandomForest;
pub use knn::KNearestNeighbors;
pub use linear::LinearRegression;
pub use svr::SupportVectorRegression;

use crate::ForecastError;

/// Fit/predict capability shared by all strategies.
pub trait Regressor {
    /// Fits the model to `(feature, target)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if the slices differ in length, are empty,
    /// or hold fewer samples than the strategy requires.
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError>;

    /// Predicts one value per feature.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::NotFitted`] if called before [`Self::fit`].
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError>;
}

/// A regression strategy selected by [`ModelKind`].
#[derive(Debug, Clone)]
pub enum Estimator {
    Linear(LinearRegression),
    Knn(KNearestNeighbors),
    Svm(SupportVectorRegression),
    RandomForest(RandomForest),
}

impl Estimator {
    /// Builds the unfitted strategy for `kind` with its standard
    /// hyperparameters.
    #[must_use]
    pub fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Linear => Self::Linear(LinearRegression::default()),
            ModelKind::Knn => Self::Knn(KNearestNeighbors::default()),
            ModelKind::Svm => Self::Svm(SupportVectorRegression::default()),
            ModelKind::RandomForest => Self::RandomForest(RandomForest::default()),
        }
    }

    /// The kind this estimator was built for.
    #[must_use]
    pub const fn kind(&self) -> ModelKind {
        match self {
            Self::Linear(_) => ModelKind::Linear,
            Self::Knn(_) => ModelKind::Knn,
            Self::Svm(_) => ModelKind::Svm,
            Self::RandomForest(_) => ModelKind::RandomForest,
        }
    }
}

impl Regressor for Estimator {
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError> {
        match self {
            Self::Linear(m) => m.fit(features, targets),
            Self::Knn(m) => m.fit(features, targets),
            Self::Svm(m) => m.fit(features, targets),
            Self::RandomForest(m) => m.fit(features, targets),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        match self {
            Self::Linear(m) => m.predict(features),
            Self::Knn(m) => m.predict(features),
            Self::Svm(m) => m.predict(features),
            Self::RandomForest(m) => m.predict(features),
        }
    }
}

/// Validates a training set: equal lengths and at least one sample.
pub(crate) fn check_training_set(
    features: &[f64],
    targets: &[f64],
) -> Result<(), ForecastError> {
    if features.len() != targets.len() {
        return Err(ForecastError::LengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }
    if features.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
