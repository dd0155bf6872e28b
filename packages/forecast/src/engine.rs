//! Fits a regression strategy to one district's history and predicts
//! future years.

use crime_trends_forecast_models::{FeatureScaling, ForecastResult, ModelKind, PredictedValue};
use crime_trends_records_models::DistrictSeries;

use crate::ForecastError;
use crate::accuracy;
use crate::regressors::{Estimator, Regressor};
use crate::scaler::StandardScaler;

/// Fewest distinct years a history must span to be forecast.
pub const MIN_DISTINCT_YEARS: usize = 2;

/// Forecast driver. Holds only the feature-scaling choice; every call fits
/// a fresh model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine {
    scaling: FeatureScaling,
}

/// A model fitted to one series together with the feature transform it
/// was fitted under.
#[derive(Debug, Clone)]
pub struct FittedForecast<R> {
    model: R,
    scaler: StandardScaler,
    history_years: Vec<f64>,
}

impl ForecastEngine {
    #[must_use]
    pub const fn new(scaling: FeatureScaling) -> Self {
        Self { scaling }
    }

    /// Fits `model` to `series`.
    ///
    /// The scaler is fitted on the history's years only, never on target
    /// years.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientData`] if the series spans fewer
    /// than [`MIN_DISTINCT_YEARS`] distinct years, or any error the model
    /// raises while fitting.
    pub fn fit<R: Regressor>(
        &self,
        mut model: R,
        series: &DistrictSeries,
    ) -> Result<FittedForecast<R>, ForecastError> {
        let available = series.distinct_years();
        if available < MIN_DISTINCT_YEARS {
            return Err(ForecastError::InsufficientData {
                required: MIN_DISTINCT_YEARS,
                available,
            });
        }

        let history_years: Vec<f64> = series.years().into_iter().map(f64::from).collect();
        let scaler = StandardScaler::for_scaling(self.scaling, &history_years);
        let features = scaler.transform_all(&history_years);

        model.fit(&features, &series.values())?;

        Ok(FittedForecast {
            model,
            scaler,
            history_years,
        })
    }

    /// Predicts `target_years` for `series` with the strategy `kind`.
    ///
    /// Returns exactly one value per target year, in the order requested.
    ///
    /// # Errors
    ///
    /// See [`Self::fit`].
    pub fn forecast(
        &self,
        series: &DistrictSeries,
        kind: ModelKind,
        target_years: &[i32],
    ) -> Result<Vec<PredictedValue>, ForecastError> {
        self.fit(Estimator::for_kind(kind), series)?
            .predict_years(target_years)
    }

    /// Fits once, predicts `target_years`, and scores the fit in-sample.
    ///
    /// # Errors
    ///
    /// See [`Self::fit`].
    pub fn forecast_with_accuracy(
        &self,
        series: &DistrictSeries,
        kind: ModelKind,
        target_years: &[i32],
    ) -> Result<ForecastResult, ForecastError> {
        let fitted = self.fit(Estimator::for_kind(kind), series)?;
        let predicted = fitted.predict_years(target_years)?;
        let accuracy = accuracy::evaluate(series, &fitted.in_sample()?)?;

        log::debug!(
            "Forecast {} / {} with {kind}: {} values, mae={}",
            series.district,
            series.metric_name,
            predicted.len(),
            accuracy.mae
        );

        Ok(ForecastResult {
            district: series.district.clone(),
            metric_name: series.metric_name.clone(),
            model_kind: kind,
            predicted,
            accuracy,
        })
    }
}

impl<R: Regressor> FittedForecast<R> {
    /// Unrounded predictions for `years`.
    ///
    /// # Errors
    ///
    /// Returns any error the model raises while predicting.
    pub fn predict_raw(&self, years: &[i32]) -> Result<Vec<f64>, ForecastError> {
        let features: Vec<f64> = years
            .iter()
            .map(|&y| self.scaler.transform(f64::from(y)))
            .collect();
        self.model.predict(&features)
    }

    /// Predictions for `years`, rounded to whole counts (ties to even).
    ///
    /// # Errors
    ///
    /// Returns any error the model raises while predicting.
    pub fn predict_years(&self, years: &[i32]) -> Result<Vec<PredictedValue>, ForecastError> {
        let raw = self.predict_raw(years)?;
        Ok(years
            .iter()
            .zip(raw)
            .map(|(&year, value)| PredictedValue {
                year,
                #[allow(clippy::cast_possible_truncation)]
                value: value.round_ties_even() as i64,
            })
            .collect())
    }

    /// The model applied to the years it was fitted on.
    ///
    /// # Errors
    ///
    /// Returns any error the model raises while predicting.
    pub fn in_sample(&self) -> Result<Vec<f64>, ForecastError> {
        self.model.predict(&self.scaler.transform_all(&self.history_years))
    }

    #[must_use]
    pub const fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

/// Forecasts with standardized features.
///
/// # Errors
///
/// See [`ForecastEngine::fit`].
pub fn forecast(
    series: &DistrictSeries,
    kind: ModelKind,
    target_years: &[i32],
) -> Result<Vec<PredictedValue>, ForecastError> {
    ForecastEngine::default().forecast(series, kind, target_years)
}

#[cfg(test)]
mod tests {
    use crime_trends_records_models::YearValue;

    use super::*;
    use crate::regressors::LinearRegression;

    fn series(points: &[(i32, f64)]) -> DistrictSeries {
        DistrictSeries::new(
            "Mitte",
            "total",
            points
                .iter()
                .map(|&(year, value)| YearValue { year, value })
                .collect(),
        )
    }

    fn linear_series() -> DistrictSeries {
        let points: Vec<(i32, f64)> = (0..10)
            .map(|i| (2014 + i, f64::from(i).mul_add(10.0, 100.0)))
            .collect();
        series(&points)
    }

    fn noisy_series() -> DistrictSeries {
        series(&[
            (2014, 120.0),
            (2015, 135.0),
            (2016, 128.0),
            (2017, 150.0),
            (2018, 161.0),
            (2019, 158.0),
            (2020, 170.0),
        ])
    }

    #[test]
    fn linear_history_extrapolates_exactly() {
        let result = ForecastEngine::default()
            .forecast_with_accuracy(&linear_series(), ModelKind::Linear, &[2024])
            .unwrap();

        assert_eq!(
            result.predicted,
            vec![PredictedValue {
                year: 2024,
                value: 200
            }]
        );
        assert!(result.accuracy.mae < 1e-9);
        assert!((result.accuracy.r2.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn every_model_returns_one_value_per_year_in_order() {
        let targets = [2026, 2024, 2025];
        for &kind in ModelKind::all() {
            let predicted = forecast(&noisy_series(), kind, &targets).unwrap();
            let years: Vec<i32> = predicted.iter().map(|p| p.year).collect();
            assert_eq!(years, targets, "{kind} changed the year order");
        }
    }

    #[test]
    fn scale_invariant_models_ignore_scaling() {
        let targets = [2021, 2022, 2023];
        let scaled = ForecastEngine::new(FeatureScaling::Standard);
        let raw = ForecastEngine::new(FeatureScaling::None);

        for kind in [ModelKind::Linear, ModelKind::RandomForest] {
            assert_eq!(
                scaled.forecast(&noisy_series(), kind, &targets).unwrap(),
                raw.forecast(&noisy_series(), kind, &targets).unwrap(),
                "{kind} depends on feature scaling"
            );
        }
    }

    #[test]
    fn random_forest_is_deterministic() {
        let targets = [2021, 2022];
        let first = forecast(&noisy_series(), ModelKind::RandomForest, &targets).unwrap();
        let second = forecast(&noisy_series(), ModelKind::RandomForest, &targets).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn knn_averages_last_five_years() {
        let predicted = forecast(&linear_series(), ModelKind::Knn, &[2024]).unwrap();
        assert_eq!(predicted[0].value, 170);
    }

    #[test]
    fn knn_clamps_to_short_history() {
        let short = series(&[(2021, 10.0), (2022, 20.0), (2023, 30.0)]);
        let predicted = forecast(&short, ModelKind::Knn, &[2024]).unwrap();
        assert_eq!(predicted[0].value, 20);
    }

    #[test]
    fn single_year_is_insufficient() {
        let one = series(&[(2023, 10.0)]);
        for &kind in ModelKind::all() {
            assert!(matches!(
                forecast(&one, kind, &[2024]),
                Err(ForecastError::InsufficientData {
                    required: 2,
                    available: 1
                })
            ));
        }
    }

    #[test]
    fn empty_target_list_yields_empty_forecast() {
        let predicted = forecast(&noisy_series(), ModelKind::Svm, &[]).unwrap();
        assert!(predicted.is_empty());
    }

    #[test]
    fn scaler_uses_history_only() {
        let fitted = ForecastEngine::default()
            .fit(LinearRegression::default(), &linear_series())
            .unwrap();
        assert!((fitted.scaler().mean() - 2018.5).abs() < 1e-12);
        let in_sample = fitted.in_sample().unwrap();
        assert_eq!(in_sample.len(), 10);
    }

    #[test]
    fn constant_history_has_undefined_r2() {
        let flat = series(&[(2020, 5.0), (2021, 5.0), (2022, 5.0)]);
        let result = ForecastEngine::default()
            .forecast_with_accuracy(&flat, ModelKind::Linear, &[2023])
            .unwrap();
        assert_eq!(result.predicted[0].value, 5);
        assert!(result.accuracy.r2.is_none());
    }
}
