//! `GeoJSON` boundary layer loading.

use std::path::Path;

use crime_trends_geography_models::GeometryRecord;
use geo::MultiPolygon;
use geojson::{Feature, GeoJson};

use crate::GeographyError;
use crate::normalize::normalize;

/// Reads a boundary layer from a `GeoJSON` file.
///
/// # Errors
///
/// See [`parse_boundaries`]. Also returns [`GeographyError::Io`] if the file
/// cannot be read.
pub fn read_boundaries(
    path: &Path,
    name_property: &str,
) -> Result<Vec<GeometryRecord>, GeographyError> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_boundaries(&text, name_property)?;
    log::info!(
        "Loaded {} district boundaries from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parses a `GeoJSON` `FeatureCollection` into boundary records, labelling
/// each with the feature property `name_property`.
///
/// Features without that property, without geometry, or with a geometry
/// other than `Polygon` or `MultiPolygon` are skipped with a warning.
///
/// # Errors
///
/// Returns [`GeographyError::GeoJson`] if `text` is not valid `GeoJSON`, or
/// [`GeographyError::Conversion`] if it is not a `FeatureCollection`.
pub fn parse_boundaries(
    text: &str,
    name_property: &str,
) -> Result<Vec<GeometryRecord>, GeographyError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(GeographyError::Conversion {
            message: "Boundary layer is not a FeatureCollection".to_string(),
        });
    };

    let total = collection.features.len();
    let records: Vec<GeometryRecord> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| to_record(i, feature, name_property))
        .collect();

    if records.len() < total {
        log::warn!(
            "Skipped {} of {total} boundary features",
            total - records.len()
        );
    }

    Ok(records)
}

fn to_record(index: usize, feature: Feature, name_property: &str) -> Option<GeometryRecord> {
    let name = match feature.property(name_property) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => {
            log::warn!("Boundary feature {index} has no '{name_property}' label");
            return None;
        }
    };

    let Some(geometry) = feature.geometry else {
        log::warn!("Boundary feature {index} ({name}) has no geometry");
        return None;
    };

    let Some(polygon) = to_multipolygon(geometry) else {
        log::warn!("Boundary feature {index} ({name}) is not a polygon");
        return None;
    };

    Some(GeometryRecord {
        normalized_name: normalize(&name),
        district_name: name,
        polygon,
    })
}

/// Converts a `GeoJSON` geometry to a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
