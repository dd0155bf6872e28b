//! CSV export of forecast values.

use crime_trends_forecast_models::{ForecastResult, PredictedValue};

use crate::ForecastError;

/// Header of the predicted-value column for `metric`.
#[must_use]
pub fn value_column(metric: &str) -> String {
    format!("{metric}_forecast")
}

/// Writes `(year, predicted value)` rows with a header row.
///
/// # Errors
///
/// Returns [`ForecastError`] if the CSV writer fails.
pub fn to_csv(metric: &str, predicted: &[PredictedValue]) -> Result<String, ForecastError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["year", value_column(metric).as_str()])?;
    for p in predicted {
        writer.write_record([p.year.to_string(), p.value.to_string()])?;
    }

    let bytes = writer.into_inner().map_err(|e| ForecastError::Export {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| ForecastError::Export {
        message: e.to_string(),
    })
}

/// Suggested file name for a forecast export.
///
/// Characters that are awkward in file names are replaced with `_`.
#[must_use]
pub fn file_name(result: &ForecastResult) -> String {
    let sanitize = |s: &str| {
        s.trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>()
    };

    format!(
        "forecast_{}_{}_{}.csv",
        sanitize(&result.metric_name),
        sanitize(&result.district),
        result.model_kind
    )
}
