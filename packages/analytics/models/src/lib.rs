#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for cross-district summaries.

use crime_trends_forecast_models::ForecastResult;
use serde::{Deserialize, Serialize};

/// Mean of one metric across all of a district's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictMean {
    /// District label.
    pub district: String,
    /// Arithmetic mean of the district's values.
    pub mean: f64,
    /// Number of values averaged.
    pub observations: usize,
}

/// Outcome of forecasting one district in an all-districts overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ForecastOutcome {
    /// The district was fitted and forecast.
    Forecast(ForecastResult),
    /// The district could not be forecast.
    #[serde(rename_all = "camelCase")]
    Skipped {
        /// District label.
        district: String,
        /// Why the district was skipped.
        reason: String,
    },
}

impl ForecastOutcome {
    #[must_use]
    pub fn district(&self) -> &str {
        match self {
            Self::Forecast(result) => &result.district,
            Self::Skipped { district, .. } => district,
        }
    }

    #[must_use]
    pub const fn result(&self) -> Option<&ForecastResult> {
        match self {
            Self::Forecast(result) => Some(result),
            Self::Skipped { .. } => None,
        }
    }
}
