#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forecast model selection and result types.
//!
//! A forecast fits one regression strategy to a single district's history
//! of one metric and predicts values for future years.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Regression strategy used to fit a district's history.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModelKind {
    /// Ordinary least squares line through `(year, value)`.
    Linear,
    /// Mean of the 5 nearest years.
    Knn,
    /// Epsilon support-vector regression with an RBF kernel.
    Svm,
    /// Bagged ensemble of 100 regression trees.
    RandomForest,
}

impl ModelKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Knn, Self::Svm, Self::Linear, Self::RandomForest]
    }

    /// Human-readable label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear Regression",
            Self::Knn => "KNN",
            Self::Svm => "SVM",
            Self::RandomForest => "Random Forest",
        }
    }
}

/// How the year feature is transformed before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureScaling {
    /// Zero mean, unit variance, using statistics of the history only.
    #[default]
    Standard,
    /// Raw calendar years.
    None,
}

/// A forecast value for one year, rounded to a whole count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedValue {
    /// Target year.
    pub year: i32,
    /// Predicted value, rounded to the nearest integer.
    pub value: i64,
}

/// In-sample fit quality of a model.
///
/// Computed by re-predicting the years the model was fitted on. This says
/// how well the model describes the history, not how accurate its forecasts
/// for future years are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accuracy {
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination, `None` when the history has zero
    /// variance and the score is undefined.
    pub r2: Option<f64>,
}

/// Forecast for one `(district, metric, model)` selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// District label.
    pub district: String,
    /// Metric name.
    pub metric_name: String,
    /// Strategy used.
    pub model_kind: ModelKind,
    /// One prediction per requested year, in request order.
    pub predicted: Vec<PredictedValue>,
    /// In-sample accuracy of the fitted model.
    pub accuracy: Accuracy,
}
