//! Page registry and page handlers.
//!
//! Each page is a plain function from the loaded data and the user's
//! selection to a [`PageOutput`]. [`PageRegistry`] maps every [`PageId`] to
//! its handler and is built once in `main`.

use std::path::PathBuf;

use clap::Args;
use crime_trends_analytics::{forecast_all_districts, means_by_district, trend_lines};
use crime_trends_analytics_models::{DistrictMean, ForecastOutcome};
use crime_trends_forecast::ForecastEngine;
use crime_trends_forecast_models::{ForecastResult, ModelKind};
use crime_trends_geography::{boundaries, choropleth, join};
use crime_trends_geography_models::{ColorClass, ColorThresholds, GeometryRecord, JoinedDistrict};
use crime_trends_records::RecordStore;
use crime_trends_records::table::TableLayout;
use crime_trends_records_models::{DistrictSeries, ValueRange};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::CliError;
use crate::config::AppConfig;

/// Identifies one page of the application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PageId {
    /// Every district's history of one metric, plus mean rankings.
    Trends,
    /// One district forecast with a selectable model.
    Prediction,
    /// Linear forecast for one district and for all districts.
    Regression,
    /// Choropleth of one year's crime counts.
    Map,
}

impl PageId {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Trends => "Trends",
            Self::Prediction => "Prediction",
            Self::Regression => "Linear Regression",
            Self::Map => "Map",
        }
    }

    /// Whether the page needs the district boundary layer.
    #[must_use]
    pub const fn needs_boundaries(self) -> bool {
        matches!(self, Self::Map)
    }
}

/// User selection shared by all pages. Unset values fall back to the
/// configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct Selection {
    /// Metric column to analyze (defaults to the configured crime count column)
    #[arg(long)]
    pub metric: Option<String>,
    /// District to forecast (defaults to the first district in the table)
    #[arg(long)]
    pub district: Option<String>,
    /// Regression model: linear, knn, svm or `random_forest`
    #[arg(long)]
    pub model: Option<ModelKind>,
    /// Comma-separated years to forecast (defaults to the years after the last recorded one)
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,
    /// Year shown on the map (defaults to the last recorded year)
    #[arg(long)]
    pub year: Option<i32>,
    /// Smallest crime count shown on the map
    #[arg(long)]
    pub min_count: Option<f64>,
    /// Largest crime count shown on the map
    #[arg(long)]
    pub max_count: Option<f64>,
    /// Counts above this are colored red
    #[arg(long)]
    pub red_floor: Option<i64>,
    /// Counts above this (and not red) are colored orange
    #[arg(long)]
    pub orange_floor: Option<i64>,
    /// Directory to write the forecast CSV into
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
    /// File to write the choropleth `GeoJSON` to
    #[arg(long)]
    pub geojson: Option<PathBuf>,
}

/// Data loaded once per invocation.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: RecordStore,
    pub boundaries: Option<Vec<GeometryRecord>>,
}

impl AppContext {
    /// Loads the records table and, if requested, the boundary layer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if either input cannot be read or parsed.
    pub fn load(config: AppConfig, with_boundaries: bool) -> Result<Self, CliError> {
        let layout = TableLayout::new(&config.columns.district, &config.columns.year);
        let store = layout.read_csv(&config.data.records)?;

        let boundaries = if with_boundaries {
            Some(boundaries::read_boundaries(
                &config.data.boundaries,
                &config.boundaries.name_property,
            )?)
        } else {
            None
        };

        Ok(Self {
            config,
            store,
            boundaries,
        })
    }

    fn metric(&self, selection: &Selection) -> String {
        selection
            .metric
            .clone()
            .unwrap_or_else(|| self.config.columns.crime_count.clone())
    }

    fn district(&self, selection: &Selection) -> Result<String, CliError> {
        selection
            .district
            .clone()
            .or_else(|| self.store.districts().first().cloned())
            .ok_or(CliError::EmptyTable)
    }

    /// Explicitly selected years, or the `horizon` years after the last
    /// recorded one.
    fn target_years(&self, selection: &Selection, horizon: u16) -> Result<Vec<i32>, CliError> {
        if !selection.years.is_empty() {
            return Ok(selection.years.clone());
        }
        let last = self.store.years().last().copied().ok_or(CliError::EmptyTable)?;
        Ok((1..=i32::from(horizon)).map(|offset| last + offset).collect())
    }
}

/// One row of the map page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRow {
    pub name: String,
    pub crime_count: Option<i64>,
    pub percent_change: Option<f64>,
    pub color: ColorClass,
    pub tooltip: String,
    pub popup: String,
}

impl From<&JoinedDistrict<'_>> for MapRow {
    fn from(district: &JoinedDistrict<'_>) -> Self {
        Self {
            name: district.name().to_string(),
            crime_count: district.crime_count,
            percent_change: district.percent_change,
            color: district.color_class,
            tooltip: choropleth::tooltip(district),
            popup: choropleth::popup(district),
        }
    }
}

/// What a page computed, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageOutput {
    #[serde(rename_all = "camelCase")]
    Trends {
        metric: String,
        lines: Vec<DistrictSeries>,
        means: Vec<DistrictMean>,
    },
    #[serde(rename_all = "camelCase")]
    Prediction {
        history: DistrictSeries,
        result: ForecastResult,
    },
    #[serde(rename_all = "camelCase")]
    Regression {
        history: DistrictSeries,
        result: ForecastResult,
        overview: Vec<ForecastOutcome>,
    },
    #[serde(rename_all = "camelCase")]
    Map {
        year: i32,
        metric: String,
        thresholds: ColorThresholds,
        rows: Vec<MapRow>,
        #[serde(skip)]
        geojson: String,
    },
}

/// A page handler.
pub type PageHandler = fn(&AppContext, &Selection) -> Result<PageOutput, CliError>;

/// Route table from page identifier to handler.
pub struct PageRegistry {
    routes: Vec<(PageId, PageHandler)>,
}

impl PageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: vec![
                (PageId::Trends, trends_page as PageHandler),
                (PageId::Prediction, prediction_page as PageHandler),
                (PageId::Regression, regression_page as PageHandler),
                (PageId::Map, map_page as PageHandler),
            ],
        }
    }

    /// Registered pages in navigation order.
    pub fn pages(&self) -> impl Iterator<Item = PageId> + '_ {
        self.routes.iter().map(|(id, _)| *id)
    }

    #[must_use]
    pub fn handler(&self, page: PageId) -> Option<PageHandler> {
        self.routes
            .iter()
            .find(|(id, _)| *id == page)
            .map(|(_, handler)| *handler)
    }

    /// Runs the handler for `page`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownPage`] if no handler is registered, or any
    /// error the handler raises.
    pub fn render(
        &self,
        page: PageId,
        context: &AppContext,
        selection: &Selection,
    ) -> Result<PageOutput, CliError> {
        let handler = self.handler(page).ok_or(CliError::UnknownPage(page))?;
        log::debug!("Rendering page {page}");
        handler(context, selection)
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn trends_page(context: &AppContext, selection: &Selection) -> Result<PageOutput, CliError> {
    let metric = context.metric(selection);
    let lines = trend_lines(&context.store, &metric)?;
    let means = means_by_district(context.store.records(), &metric);

    Ok(PageOutput::Trends {
        metric,
        lines,
        means,
    })
}

fn prediction_page(context: &AppContext, selection: &Selection) -> Result<PageOutput, CliError> {
    let metric = context.metric(selection);
    let district = context.district(selection)?;
    let model = selection.model.unwrap_or(context.config.forecast.model);
    let years = context.target_years(selection, context.config.forecast.prediction_horizon)?;

    let history = context.store.series(&district, &metric)?;
    let result = ForecastEngine::default().forecast_with_accuracy(&history, model, &years)?;

    Ok(PageOutput::Prediction { history, result })
}

fn regression_page(context: &AppContext, selection: &Selection) -> Result<PageOutput, CliError> {
    let metric = context.metric(selection);
    let district = context.district(selection)?;
    let model = selection.model.unwrap_or(ModelKind::Linear);
    let years = context.target_years(selection, context.config.forecast.regression_horizon)?;
    let engine = ForecastEngine::default();

    let history = context.store.series(&district, &metric)?;
    let result = engine.forecast_with_accuracy(&history, model, &years)?;
    let overview = forecast_all_districts(&context.store, &engine, &metric, model, &years)?;

    Ok(PageOutput::Regression {
        history,
        result,
        overview,
    })
}

fn map_page(context: &AppContext, selection: &Selection) -> Result<PageOutput, CliError> {
    let polygons = context
        .boundaries
        .as_deref()
        .ok_or(CliError::MissingBoundaries)?;
    let columns = &context.config.columns;
    let defaults = &context.config.map;

    let year = match selection.year {
        Some(year) => year,
        None => context
            .store
            .years()
            .last()
            .copied()
            .ok_or(CliError::EmptyTable)?,
    };
    let default_range = defaults.range();
    let range = ValueRange::new(
        selection.min_count.unwrap_or(default_range.min),
        selection.max_count.unwrap_or(default_range.max),
    );
    let default_thresholds = defaults.thresholds();
    let thresholds = ColorThresholds::new(
        selection.red_floor.unwrap_or(default_thresholds.red_floor),
        selection.orange_floor.unwrap_or(default_thresholds.orange_floor),
    );

    let counts = context.store.filter(year, range, &columns.crime_count)?;
    let changes = context
        .store
        .records_for_year(year, &columns.percent_change)?;

    let joined = join(polygons, &counts, &changes, &thresholds);

    Ok(PageOutput::Map {
        year,
        metric: columns.crime_count.clone(),
        thresholds,
        rows: joined.iter().map(MapRow::from).collect(),
        geojson: choropleth::to_geojson_string(&joined)?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const TABLE: &str = "\
Bezeichnung_(Bezirksregion),Jahr,Straftaten(insgesamt),Prozentualle_Veränderung_zum_Vorjahr
Mitte,2021,41000,
Mitte,2022,42000,2.4
Mitte,2023,43000,2.4
Pankow,2021,31000,
Pankow,2022,30500,-1.6
Pankow,2023,35000,14.8
";

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Gemeinde_n": "MITTE " },
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] }
            },
            {
                "type": "Feature",
                "properties": { "Gemeinde_n": "Unknown District" },
                "geometry": { "type": "Polygon", "coordinates": [[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 0.0]]] }
            }
        ]
    }"#;

    fn context() -> AppContext {
        let config = AppConfig::load(None).unwrap();
        let store = TableLayout::new(&config.columns.district, &config.columns.year)
            .parse(TABLE.as_bytes())
            .unwrap();
        let boundaries = boundaries::parse_boundaries(LAYER, &config.boundaries.name_property).unwrap();
        AppContext {
            config,
            store,
            boundaries: Some(boundaries),
        }
    }

    #[test]
    fn every_page_resolves_exactly_once() {
        let registry = PageRegistry::new();
        let all = [PageId::Trends, PageId::Prediction, PageId::Regression, PageId::Map];
        for page in all {
            assert!(registry.handler(page).is_some(), "{page} has no handler");
        }
        let pages: Vec<PageId> = registry.pages().collect();
        let unique: HashSet<PageId> = pages.iter().copied().collect();
        assert_eq!(pages.len(), unique.len());
        assert_eq!(pages, all);
    }

    #[test]
    fn page_ids_parse_case_insensitively() {
        assert_eq!("MAP".parse::<PageId>().unwrap(), PageId::Map);
        assert_eq!("regression".parse::<PageId>().unwrap(), PageId::Regression);
        assert!("heatmap".parse::<PageId>().is_err());
    }

    #[test]
    fn trends_page_ranks_means() {
        let output = PageRegistry::new()
            .render(PageId::Trends, &context(), &Selection::default())
            .unwrap();
        let PageOutput::Trends { lines, means, .. } = output else {
            panic!("wrong page output");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(means[0].district, "Pankow");
        assert!((means[1].mean - 42_000.0).abs() < 1e-9);
    }

    #[test]
    fn prediction_page_forecasts_the_next_year() {
        let selection = Selection {
            district: Some("Mitte".to_string()),
            model: Some(ModelKind::Linear),
            ..Selection::default()
        };
        let output = PageRegistry::new()
            .render(PageId::Prediction, &context(), &selection)
            .unwrap();
        let PageOutput::Prediction { history, result } = output else {
            panic!("wrong page output");
        };
        assert_eq!(history.len(), 3);
        assert_eq!(result.model_kind, ModelKind::Linear);
        assert_eq!(result.predicted.len(), 1);
        assert_eq!(result.predicted[0].year, 2024);
        assert_eq!(result.predicted[0].value, 44_000);
    }

    #[test]
    fn prediction_page_defaults_to_configured_model() {
        let selection = Selection {
            district: Some("Mitte".to_string()),
            ..Selection::default()
        };
        let output = PageRegistry::new()
            .render(PageId::Prediction, &context(), &selection)
            .unwrap();
        let PageOutput::Prediction { result, .. } = output else {
            panic!("wrong page output");
        };
        assert_eq!(result.model_kind, ModelKind::Knn);
        assert_eq!(result.predicted[0].value, 42_000);
    }

    #[test]
    fn regression_page_covers_all_districts() {
        let output = PageRegistry::new()
            .render(PageId::Regression, &context(), &Selection::default())
            .unwrap();
        let PageOutput::Regression {
            result, overview, ..
        } = output
        else {
            panic!("wrong page output");
        };
        assert_eq!(result.district, "Mitte");
        let years: Vec<i32> = result.predicted.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2024, 2025, 2026]);
        assert_eq!(overview.len(), 2);
        assert!(overview.iter().all(|o| o.result().is_some()));
    }

    #[test]
    fn map_page_joins_and_classifies() {
        let output = PageRegistry::new()
            .render(PageId::Map, &context(), &Selection::default())
            .unwrap();
        let PageOutput::Map {
            year, rows, geojson, ..
        } = output
        else {
            panic!("wrong page output");
        };
        assert_eq!(year, 2023);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].crime_count, Some(43_000));
        assert_eq!(rows[0].color, ColorClass::Red);
        assert_eq!(rows[0].popup, "Change from previous year: 2.4%");

        assert_eq!(rows[1].crime_count, None);
        assert_eq!(rows[1].color, ColorClass::Green);
        assert_eq!(rows[1].tooltip, "Unknown District: 0 offenses");
        assert_eq!(rows[1].popup, "no data");

        assert!(geojson.contains("FeatureCollection"));
    }

    #[test]
    fn map_page_applies_selection_overrides() {
        let selection = Selection {
            year: Some(2022),
            max_count: Some(40_000.0),
            red_floor: Some(50_000),
            ..Selection::default()
        };
        let output = PageRegistry::new()
            .render(PageId::Map, &context(), &selection)
            .unwrap();
        let PageOutput::Map { rows, .. } = output else {
            panic!("wrong page output");
        };
        assert_eq!(rows[0].crime_count, None);
        assert_eq!(rows[0].color, ColorClass::Green);
    }

    #[test]
    fn map_page_requires_boundaries() {
        let mut context = context();
        context.boundaries = None;
        let err = PageRegistry::new()
            .render(PageId::Map, &context, &Selection::default())
            .unwrap_err();
        assert!(matches!(err, CliError::MissingBoundaries));
    }

    #[test]
    fn map_page_reports_missing_percent_change_column() {
        let mut context = context();
        context.config.columns.percent_change = "Prozentuale_Veraenderung".to_string();
        let err = PageRegistry::new()
            .render(PageId::Map, &context, &Selection::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Records(crime_trends_records::RecordError::NotFound { kind: "metric", ref name })
                if name == "Prozentuale_Veraenderung"
        ));
    }
}
