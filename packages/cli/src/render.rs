//! Text and JSON rendering of page outputs, and file exports.

use std::io::Write;
use std::path::PathBuf;

use crime_trends_analytics_models::ForecastOutcome;
use crime_trends_forecast::export;
use crime_trends_forecast_models::ForecastResult;
use crime_trends_records_models::DistrictSeries;

use crate::CliError;
use crate::pages::{MapRow, PageOutput, Selection};

/// Writes `output` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CliError`] if serialization or writing fails.
pub fn write_json(out: &mut impl Write, output: &PageOutput) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, output)?;
    writeln!(out)?;
    Ok(())
}

/// Writes `output` as human-readable text.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_text(out: &mut impl Write, output: &PageOutput) -> std::io::Result<()> {
    match output {
        PageOutput::Trends {
            metric,
            lines,
            means,
        } => {
            writeln!(out, "Trend of {metric}")?;
            for line in lines {
                write_series_line(out, line)?;
            }
            writeln!(out)?;
            writeln!(out, "Mean {metric} by district")?;
            for mean in means {
                writeln!(out, "  {:<40} {:>12.1}", mean.district, mean.mean)?;
            }
        }
        PageOutput::Prediction { history, result } => {
            write_forecast(out, history, result)?;
        }
        PageOutput::Regression {
            history,
            result,
            overview,
        } => {
            write_forecast(out, history, result)?;
            writeln!(out)?;
            writeln!(out, "Forecasts for all districts ({})", result.metric_name)?;
            for outcome in overview {
                write_outcome(out, outcome)?;
            }
        }
        PageOutput::Map {
            year,
            metric,
            thresholds,
            rows,
            ..
        } => {
            writeln!(
                out,
                "{metric} in {year} (red > {}, orange > {})",
                thresholds.red_floor, thresholds.orange_floor
            )?;
            for row in rows {
                write_map_row(out, row)?;
            }
        }
    }
    Ok(())
}

fn write_series_line(out: &mut impl Write, series: &DistrictSeries) -> std::io::Result<()> {
    let points: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{}={}", p.year, p.value))
        .collect();
    writeln!(out, "  {:<40} {}", series.district, points.join(" "))
}

fn write_forecast(
    out: &mut impl Write,
    history: &DistrictSeries,
    result: &ForecastResult,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{} in {} with {}",
        result.metric_name,
        result.district,
        result.model_kind.label()
    )?;

    writeln!(out, "History")?;
    for point in &history.points {
        writeln!(out, "  {:<6} {}", point.year, point.value)?;
    }

    writeln!(out, "Forecast")?;
    writeln!(
        out,
        "  {:<6} {}",
        "year",
        export::value_column(&result.metric_name)
    )?;
    for predicted in &result.predicted {
        writeln!(out, "  {:<6} {}", predicted.year, predicted.value)?;
    }

    writeln!(out, "MAE: {:.3}", result.accuracy.mae)?;
    match result.accuracy.r2 {
        Some(r2) => writeln!(out, "R2: {r2:.4}"),
        None => writeln!(out, "R2: undefined"),
    }
}

fn write_outcome(out: &mut impl Write, outcome: &ForecastOutcome) -> std::io::Result<()> {
    match outcome {
        ForecastOutcome::Forecast(result) => {
            let values: Vec<String> = result
                .predicted
                .iter()
                .map(|p| format!("{}={}", p.year, p.value))
                .collect();
            writeln!(out, "  {:<40} {}", result.district, values.join(" "))
        }
        ForecastOutcome::Skipped { district, reason } => {
            writeln!(out, "  {district:<40} skipped: {reason}")
        }
    }
}

fn write_map_row(out: &mut impl Write, row: &MapRow) -> std::io::Result<()> {
    let change = row
        .percent_change
        .map_or_else(|| "no data".to_string(), |pct| format!("{pct}%"));
    writeln!(
        out,
        "  {:<40} {:>8} {:>10} {}",
        row.name,
        row.crime_count.unwrap_or(0),
        change,
        row.color
    )
}

/// Writes the files requested in `selection` for `output`: the forecast
/// CSV into `--export-dir` and the choropleth to `--geojson`.
///
/// Returns the paths written.
///
/// # Errors
///
/// Returns [`CliError`] if an export cannot be produced or written.
pub fn write_exports(output: &PageOutput, selection: &Selection) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::new();

    match output {
        PageOutput::Prediction { result, .. } | PageOutput::Regression { result, .. } => {
            if let Some(dir) = &selection.export_dir {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(export::file_name(result));
                std::fs::write(&path, export::to_csv(&result.metric_name, &result.predicted)?)?;
                log::info!("Wrote forecast to {}", path.display());
                written.push(path);
            }
        }
        PageOutput::Map { geojson, .. } => {
            if let Some(path) = &selection.geojson {
                std::fs::write(path, geojson)?;
                log::info!("Wrote choropleth to {}", path.display());
                written.push(path.clone());
            }
        }
        PageOutput::Trends { .. } => {}
    }

    Ok(written)
}
