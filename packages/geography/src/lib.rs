#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District boundaries joined to crime records.
//!
//! [`boundaries`] loads a `GeoJSON` `FeatureCollection` into
//! [`GeometryRecord`]s, [`join`] matches each polygon to a record through
//! [`normalize`]d names and buckets it with [`classify`], and
//! [`choropleth`] writes the styled result back out as `GeoJSON`.
//!
//! [`GeometryRecord`]: crime_trends_geography_models::GeometryRecord

pub mod boundaries;
pub mod choropleth;
pub mod classify;
pub mod join;
pub mod normalize;

pub use classify::color_class;
pub use join::join;
pub use normalize::normalize;

use thiserror::Error;

/// Errors that can occur while loading or exporting boundaries.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Reading the boundary file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the choropleth failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The `GeoJSON` is valid but not usable as a boundary layer.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
