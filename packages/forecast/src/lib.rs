#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-district regression forecasts.
//!
//! A [`engine::ForecastEngine`] fits one of the [`regressors`] to a single
//! district's `(year, value)` history and predicts future years. The year
//! feature is standardized with statistics of the history only
//! ([`scaler::StandardScaler`]); the target values are never scaled.
//! [`accuracy::evaluate`] scores the fit in-sample, and [`export`] writes
//! predictions as CSV.

pub mod accuracy;
pub mod engine;
pub mod export;
pub mod regressors;
pub mod scaler;

pub use engine::{ForecastEngine, forecast};

use thiserror::Error;

/// Errors that can occur while fitting or applying a forecast model.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The history has fewer data points than the model needs.
    #[error("Insufficient data: need at least {required} distinct years, got {available}")]
    InsufficientData {
        /// Minimum number of distinct years required.
        required: usize,
        /// Number of distinct years available.
        available: usize,
    },

    /// Feature and target slices have different lengths.
    #[error("Length mismatch: {features} features but {targets} targets")]
    LengthMismatch {
        /// Number of feature values.
        features: usize,
        /// Number of target values.
        targets: usize,
    },

    /// `predict` was called before `fit`.
    #[error("Model has not been fitted")]
    NotFitted,

    /// Writing the CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Finalizing the CSV export failed.
    #[error("Export error: {message}")]
    Export {
        /// Description of what went wrong.
        message: String,
    },
}
