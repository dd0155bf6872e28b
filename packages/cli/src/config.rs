//! TOML configuration.
//!
//! The built-in configuration is embedded at compile time via
//! [`include_str!`]; `--config` replaces it with a file.

use std::path::{Path, PathBuf};

use crime_trends_forecast_models::ModelKind;
use crime_trends_geography_models::ColorThresholds;
use crime_trends_records_models::ValueRange;
use serde::Deserialize;

use crate::CliError;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub columns: ColumnConfig,
    pub boundaries: BoundaryConfig,
    pub map: MapConfig,
    pub forecast: ForecastConfig,
}

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Crime statistics table (CSV).
    pub records: PathBuf,
    /// District boundary layer (`GeoJSON`).
    pub boundaries: PathBuf,
}

/// Names of the table columns the pages rely on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfig {
    pub district: String,
    pub year: String,
    /// Metric shown on the map and used when no metric is selected.
    pub crime_count: String,
    /// Metric shown in map popups.
    pub percent_change: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoundaryConfig {
    /// Feature property holding the district label.
    pub name_property: String,
}

/// Map filter and color defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapConfig {
    pub min_count: f64,
    pub max_count: f64,
    pub red_floor: i64,
    pub orange_floor: i64,
}

impl MapConfig {
    #[must_use]
    pub const fn range(&self) -> ValueRange {
        ValueRange::new(self.min_count, self.max_count)
    }

    #[must_use]
    pub const fn thresholds(&self) -> ColorThresholds {
        ColorThresholds::new(self.red_floor, self.orange_floor)
    }
}

/// Forecast defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ForecastConfig {
    /// Model used by the prediction page when none is selected.
    pub model: ModelKind,
    /// Years past the last recorded year predicted by the prediction page.
    pub prediction_horizon: u16,
    /// Years past the last recorded year predicted by the regression page.
    pub regression_horizon: u16,
}

impl AppConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the text is not valid TOML or a
    /// section or key is missing.
    pub fn parse(text: &str) -> Result<Self, CliError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Loads the configuration at `path`, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::parse(&std::fs::read_to_string(path)?)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_config_parses() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.columns.district, "Bezeichnung_(Bezirksregion)");
        assert_eq!(config.columns.year, "Jahr");
        assert_eq!(config.columns.crime_count, "Straftaten(insgesamt)");
        assert_eq!(config.boundaries.name_property, "Gemeinde_n");
        assert_eq!(config.forecast.model, ModelKind::Knn);
        assert_eq!(config.forecast.prediction_horizon, 1);
        assert_eq!(config.forecast.regression_horizon, 3);
        assert_eq!(config.map.thresholds(), ColorThresholds::default());
        assert_eq!(config.map.range(), ValueRange::new(0.0, 100_000.0));
    }

    #[test]
    fn custom_config_overrides_everything() {
        let text = r#"
            [data]
            records = "a.csv"
            boundaries = "b.geojson"

            [columns]
            district = "district"
            year = "year"
            crime_count = "total"
            percent_change = "change"

            [boundaries]
            name_property = "name"

            [map]
            min_count = 10
            max_count = 500.5
            red_floor = 300
            orange_floor = 100

            [forecast]
            model = "random_forest"
            prediction_horizon = 2
            regression_horizon = 5
        "#;
        let config = AppConfig::parse(text).unwrap();
        assert_eq!(config.data.records, PathBuf::from("a.csv"));
        assert_eq!(config.forecast.model, ModelKind::RandomForest);
        assert_eq!(config.map.thresholds(), ColorThresholds::new(300, 100));
        assert!((config.map.max_count - 500.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_section_is_an_error() {
        let err = AppConfig::parse("[data]\nrecords = \"a.csv\"\nboundaries = \"b\"\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
