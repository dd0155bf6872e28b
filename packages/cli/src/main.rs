#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for district crime trends.
//!
//! Loads the configured crime statistics table (and, for the map, the
//! district boundary layer), runs one page through the [`PageRegistry`],
//! and prints the result as text or JSON. Forecasts can be exported as CSV
//! and the map as `GeoJSON`.

mod config;
mod pages;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_trends_analytics::AnalyticsError;
use crime_trends_forecast::ForecastError;
use crime_trends_geography::GeographyError;
use crime_trends_records::RecordError;
use thiserror::Error;

use crate::config::AppConfig;
use crate::pages::{AppContext, PageId, PageRegistry, Selection};

/// Errors that can occur while running a page.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Records(#[from] RecordError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Geography(#[from] GeographyError),

    /// Writing JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The records table has no rows.
    #[error("The records table is empty")]
    EmptyTable,

    /// The map page ran without a boundary layer.
    #[error("District boundaries were not loaded")]
    MissingBoundaries,

    #[error("No handler registered for page {0}")]
    UnknownPage(PageId),
}

#[derive(Parser)]
#[command(
    name = "crime_trends",
    about = "District crime trends, forecasts and choropleth maps"
)]
struct Cli {
    /// Configuration file (defaults to the built-in configuration)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available pages
    Pages,
    /// List the districts, metrics and years in the records table
    Summary,
    /// Compute and print one page
    Show {
        /// Page to show: trends, prediction, regression or map
        page: PageId,
        #[command(flatten)]
        selection: Selection,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let registry = PageRegistry::new();

    match cli.command {
        Commands::Pages => {
            println!("{:<12} TITLE", "PAGE");
            println!("{}", "-".repeat(30));
            for page in registry.pages() {
                println!("{:<12} {}", page, page.title());
            }
        }
        Commands::Summary => {
            let context = AppContext::load(config, false)?;
            let years = context.store.years();
            println!("Districts ({}):", context.store.districts().len());
            for district in context.store.districts() {
                println!("  {district}");
            }
            println!("Metrics ({}):", context.store.metrics().len());
            for metric in context.store.metrics() {
                println!("  {metric}");
            }
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                println!("Years: {first}-{last}");
            }
        }
        Commands::Show { page, selection } => {
            let context = AppContext::load(config, page.needs_boundaries())?;
            let output = registry.render(page, &context, &selection)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if cli.json {
                render::write_json(&mut out, &output)?;
            } else {
                render::write_text(&mut out, &output)?;
            }

            render::write_exports(&output, &selection)?;
        }
    }

    Ok(())
}
