//! CSV loader for the district statistics table.
//!
//! The table has a district label column, a year column, and any number of
//! numeric metric columns. Every column other than the two key columns is
//! treated as a metric, keeping the header order.

use std::io::Read;
use std::path::Path;

use crime_trends_records_models::MetricRecord;

use crate::{RecordError, RecordStore};

/// Names of the key columns in the source table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Column holding the free-text district label.
    pub district_column: String,
    /// Column holding the integer year.
    pub year_column: String,
}

impl TableLayout {
    #[must_use]
    pub fn new(district_column: impl Into<String>, year_column: impl Into<String>) -> Self {
        Self {
            district_column: district_column.into(),
            year_column: year_column.into(),
        }
    }

    /// Reads a CSV file into a [`RecordStore`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the file cannot be opened, a key column is
    /// missing, a cell fails to parse, or the table has duplicate rows.
    pub fn read_csv(&self, path: &Path) -> Result<RecordStore, RecordError> {
        log::info!("Loading district table from {}", path.display());
        let file = std::fs::File::open(path)?;
        self.parse(file)
    }

    /// Parses CSV from any reader into a [`RecordStore`].
    ///
    /// Empty metric cells are treated as missing and produce no record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] on malformed input (see [`Self::read_csv`]).
    pub fn parse<R: Read>(&self, reader: R) -> Result<RecordStore, RecordError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let district_idx = column_index(&headers, &self.district_column)?;
        let year_idx = column_index(&headers, &self.year_column)?;

        let metric_columns: Vec<(usize, &String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != district_idx && *i != year_idx)
            .collect();

        let mut records = Vec::new();
        let mut rows = 0_usize;

        for result in reader.records() {
            let row = result?;
            let line = row.position().map_or(0, csv::Position::line);
            rows += 1;

            let district = row.get(district_idx).unwrap_or("").to_owned();
            if district.trim().is_empty() {
                log::warn!("Skipping line {line}: empty district label");
                continue;
            }

            let year_cell = row.get(year_idx).unwrap_or("").trim();
            let year: i32 = year_cell.parse().map_err(|e| RecordError::Parse {
                line,
                message: format!("invalid year '{year_cell}': {e}"),
            })?;

            for &(idx, metric) in &metric_columns {
                let cell = row.get(idx).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                let value: f64 = cell.parse().map_err(|e| RecordError::Parse {
                    line,
                    message: format!("invalid value '{cell}' in column '{metric}': {e}"),
                })?;
                records.push(MetricRecord {
                    district: district.clone(),
                    year,
                    metric_name: metric.clone(),
                    value,
                });
            }
        }

        log::info!(
            "Parsed {rows} rows into {} metric values across {} metric columns",
            records.len(),
            metric_columns.len()
        );

        let metric_names = metric_columns.into_iter().map(|(_, m)| m.clone()).collect();
        RecordStore::new(metric_names, records)
    }
}

fn column_index(headers: &[String], name: &str) -> Result<usize, RecordError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
}
