#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory store of per-district yearly crime metrics.
//!
//! The [`store::RecordStore`] is built once from a parsed table (see
//! [`table::TableLayout`] for the CSV loader) and is read-only afterwards.
//! Forecasting, trend aggregation and the map join all read from it.

pub mod store;
pub mod table;

pub use store::RecordStore;

use thiserror::Error;

/// Errors that can occur while building or querying the record store.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A requested district or metric has no rows.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up (`"district"` or `"metric"`).
        kind: &'static str,
        /// The name that was requested.
        name: String,
    },

    /// The same (district, year, metric) cell appeared more than once.
    #[error("Duplicate value for district '{district}', year {year}, metric '{metric}'")]
    DuplicateRecord {
        /// District label.
        district: String,
        /// Year of the duplicated row.
        year: i32,
        /// Metric column.
        metric: String,
    },

    /// A required key column is missing from the table header.
    #[error("Missing column '{0}' in table header")]
    MissingColumn(String),

    /// A cell could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the source file.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading the source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
