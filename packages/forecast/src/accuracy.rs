//! In-sample fit quality.

use crime_trends_forecast_models::Accuracy;
use crime_trends_records_models::DistrictSeries;

use crate::ForecastError;

/// Scores `predicted` (the fitted model applied to the series' own years)
/// against the series values.
///
/// `r2` is `None` when the series values have zero variance, which includes
/// every single-point series.
///
/// # Errors
///
/// Returns [`ForecastError::LengthMismatch`] if `predicted` does not have one
/// value per point, or [`ForecastError::InsufficientData`] for an empty
/// series.
pub fn evaluate(series: &DistrictSeries, predicted: &[f64]) -> Result<Accuracy, ForecastError> {
    let actual = series.values();
    score(&actual, predicted)
}

/// Mean absolute error and coefficient of determination of `predicted`
/// against `actual`.
///
/// # Errors
///
/// See [`evaluate`].
pub fn score(actual: &[f64], predicted: &[f64]) -> Result<Accuracy, ForecastError> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::LengthMismatch {
            features: predicted.len(),
            targets: actual.len(),
        });
    }
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;

    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    let r2 = if ss_tot > 0.0 {
        Some(1.0 - ss_res / ss_tot)
    } else {
        log::debug!("r2 undefined: target has zero variance");
        None
    };

    Ok(Accuracy { mae, r2 })
}
