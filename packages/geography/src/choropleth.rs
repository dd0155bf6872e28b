//! Styled `GeoJSON` export of joined districts.

use crime_trends_geography_models::JoinedDistrict;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;

use crate::GeographyError;

/// Tooltip shown when hovering a district.
#[must_use]
pub fn tooltip(district: &JoinedDistrict<'_>) -> String {
    format!("{}: {} offenses", district.name(), district.effective_count())
}

/// Popup shown when clicking a district.
#[must_use]
pub fn popup(district: &JoinedDistrict<'_>) -> String {
    district.percent_change.map_or_else(
        || "no data".to_string(),
        |pct| format!("Change from previous year: {pct}%"),
    )
}

fn properties(district: &JoinedDistrict<'_>) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(district.name()));
    properties.insert("crimeCount".to_string(), json!(district.effective_count()));
    properties.insert("percentChange".to_string(), json!(district.percent_change));
    properties.insert("color".to_string(), json!(district.color_class.to_string()));
    properties.insert("fillColor".to_string(), json!(district.style.fill_color));
    properties.insert("strokeColor".to_string(), json!(district.style.stroke_color));
    properties.insert("strokeWeight".to_string(), json!(district.style.stroke_weight));
    properties.insert("fillOpacity".to_string(), json!(district.style.fill_opacity));
    properties.insert("tooltip".to_string(), json!(tooltip(district)));
    properties.insert("popup".to_string(), json!(popup(district)));
    properties
}

/// One styled feature per joined district, in join order.
#[must_use]
pub fn to_feature_collection(joined: &[JoinedDistrict<'_>]) -> FeatureCollection {
    let features = joined
        .iter()
        .map(|district| Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&district.geometry.polygon))),
            id: None,
            properties: Some(properties(district)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Serializes the choropleth as a `GeoJSON` string.
///
/// # Errors
///
/// Returns [`GeographyError::Json`] if serialization fails.
pub fn to_geojson_string(joined: &[JoinedDistrict<'_>]) -> Result<String, GeographyError> {
    Ok(serde_json::to_string_pretty(&to_feature_collection(joined))?)
}

#[cfg(test)]
mod tests {
    use crime_trends_geography_models::{ColorThresholds, GeometryRecord};
    use crime_trends_records_models::MetricRecord;
    use geo::{LineString, MultiPolygon, Polygon};

    use super::*;
    use crate::join::join;

    fn geometry(name: &str) -> GeometryRecord {
        GeometryRecord {
            district_name: name.to_string(),
            normalized_name: crate::normalize(name),
            polygon: MultiPolygon(vec![Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
                vec![],
            )]),
        }
    }

    fn record(district: &str, value: f64) -> MetricRecord {
        MetricRecord {
            district: district.to_string(),
            year: 2023,
            metric_name: "metric".to_string(),
            value,
        }
    }

    #[test]
    fn labels_matched_and_unmatched_districts() {
        let polygons = vec![geometry("Mitte"), geometry("Unknown District")];
        let count = record("Mitte", 41_000.0);
        let change = record("Mitte", 3.5);
        let joined = join(&polygons, &[&count], &[&change], &ColorThresholds::default());

        assert_eq!(tooltip(&joined[0]), "Mitte: 41000 offenses");
        assert_eq!(popup(&joined[0]), "Change from previous year: 3.5%");
        assert_eq!(tooltip(&joined[1]), "Unknown District: 0 offenses");
        assert_eq!(popup(&joined[1]), "no data");
    }

    #[test]
    fn features_carry_style_properties() {
        let polygons = vec![geometry("Mitte"), geometry("Unknown District")];
        let count = record("Mitte", 41_000.0);
        let joined = join(&polygons, &[&count], &[], &ColorThresholds::default());

        let collection = to_feature_collection(&joined);
        assert_eq!(collection.features.len(), 2);

        let mitte = &collection.features[0];
        assert!(mitte.geometry.is_some());
        assert_eq!(mitte.property("name"), Some(&json!("Mitte")));
        assert_eq!(mitte.property("crimeCount"), Some(&json!(41_000)));
        assert_eq!(mitte.property("color"), Some(&json!("red")));
        assert_eq!(mitte.property("fillColor"), Some(&json!("red")));
        assert_eq!(mitte.property("strokeColor"), Some(&json!("black")));
        assert_eq!(mitte.property("strokeWeight"), Some(&json!(2)));
        assert_eq!(mitte.property("percentChange"), Some(&serde_json::Value::Null));

        let unknown = &collection.features[1];
        assert_eq!(unknown.property("crimeCount"), Some(&json!(0)));
        assert_eq!(unknown.property("color"), Some(&json!("green")));
    }

    #[test]
    fn serialized_output_parses_back() {
        let polygons = vec![geometry("Mitte")];
        let joined = join(&polygons, &[], &[], &ColorThresholds::default());
        let text = to_geojson_string(&joined).unwrap();
        let parsed = crate::boundaries::parse_boundaries(&text, "name").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].district_name, "Mitte");
    }
}
