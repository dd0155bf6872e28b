#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cross-district summaries over a [`RecordStore`].
//!
//! Each public function backs one overview view: districts ranked by their
//! mean value, every district's trend line, and a forecast for every
//! district fitted independently.
//!
//! [`RecordStore`]: crime_trends_records::RecordStore

pub mod trends;

pub use trends::{forecast_all_districts, means_by_district, trend_lines};

use crime_trends_records::RecordError;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Looking up records failed.
    #[error("Record error: {0}")]
    Records(#[from] RecordError),
}
