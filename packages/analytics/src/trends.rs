//! Per-district means, trend lines and forecast overviews.

use std::collections::BTreeMap;

use crime_trends_analytics_models::{DistrictMean, ForecastOutcome};
use crime_trends_forecast::ForecastEngine;
use crime_trends_forecast_models::ModelKind;
use crime_trends_records::RecordStore;
use crime_trends_records_models::{DistrictSeries, MetricRecord};

use crate::AnalyticsError;

/// Mean of `metric` per district, ascending by mean with ties broken by
/// district name.
///
/// Records of other metrics are ignored. Districts without any value for
/// `metric` do not appear.
pub fn means_by_district<'a>(
    records: impl IntoIterator<Item = &'a MetricRecord>,
    metric: &str,
) -> Vec<DistrictMean> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for record in records.into_iter().filter(|r| r.metric_name == metric) {
        let entry = sums.entry(record.district.as_str()).or_insert((0.0, 0));
        entry.0 += record.value;
        entry.1 += 1;
    }

    let mut means: Vec<DistrictMean> = sums
        .into_iter()
        .map(|(district, (sum, count))| DistrictMean {
            district: district.to_string(),
            #[allow(clippy::cast_precision_loss)]
            mean: sum / count as f64,
            observations: count,
        })
        .collect();

    means.sort_by(|a, b| {
        a.mean
            .total_cmp(&b.mean)
            .then_with(|| a.district.cmp(&b.district))
    });

    means
}

/// Every district's series for `metric`, in district order.
///
/// Districts with no values for `metric` are left out.
///
/// # Errors
///
/// Returns [`AnalyticsError::Records`] if `metric` is unknown.
pub fn trend_lines(
    store: &RecordStore,
    metric: &str,
) -> Result<Vec<DistrictSeries>, AnalyticsError> {
    let mut lines = Vec::with_capacity(store.districts().len());

    for district in store.districts() {
        let series = store.series(district, metric)?;
        if series.is_empty() {
            log::debug!("No {metric} values for {district}");
            continue;
        }
        lines.push(series);
    }

    Ok(lines)
}

/// Fits `kind` to each district's `metric` history independently and
/// predicts `target_years`.
///
/// Districts that cannot be forecast are reported as
/// [`ForecastOutcome::Skipped`] rather than dropped.
///
/// # Errors
///
/// Returns [`AnalyticsError::Records`] if `metric` is unknown.
pub fn forecast_all_districts(
    store: &RecordStore,
    engine: &ForecastEngine,
    metric: &str,
    kind: ModelKind,
    target_years: &[i32],
) -> Result<Vec<ForecastOutcome>, AnalyticsError> {
    let mut outcomes = Vec::with_capacity(store.districts().len());

    for district in store.districts() {
        let series = store.series(district, metric)?;
        let outcome = match engine.forecast_with_accuracy(&series, kind, target_years) {
            Ok(result) => ForecastOutcome::Forecast(result),
            Err(e) => {
                log::warn!("Skipping {district} for {metric}: {e}");
                ForecastOutcome::Skipped {
                    district: district.clone(),
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    let forecast = outcomes.iter().filter(|o| o.result().is_some()).count();
    log::info!(
        "Forecast {forecast} of {} districts for {metric} with {kind}",
        outcomes.len()
    );

    Ok(outcomes)
}
