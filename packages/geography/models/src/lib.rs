#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District boundary and choropleth types.
//!
//! Boundaries come from a polygon layer whose district labels are free
//! text. Joining them to crime records is purely name-based; each joined
//! district carries its count, its percent change and a color class.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One district boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    /// District label exactly as it appears in the boundary layer.
    pub district_name: String,
    /// Canonical join key derived from `district_name`.
    pub normalized_name: String,
    /// Boundary polygon(s).
    pub polygon: MultiPolygon<f64>,
}

/// Discrete choropleth bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorClass {
    Red,
    Orange,
    Green,
}

impl ColorClass {
    /// Returns all variants from the highest bucket down.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Red, Self::Orange, Self::Green]
    }

    /// Fill color used when drawing a polygon of this class.
    #[must_use]
    pub const fn fill_color(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

/// Lower bounds (exclusive) of the red and orange buckets.
///
/// `red_floor` is expected to exceed `orange_floor`; this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorThresholds {
    /// Counts above this are red.
    pub red_floor: i64,
    /// Counts above this (and not red) are orange.
    pub orange_floor: i64,
}

impl ColorThresholds {
    #[must_use]
    pub const fn new(red_floor: i64, orange_floor: i64) -> Self {
        Self {
            red_floor,
            orange_floor,
        }
    }

    /// Whether `red_floor` lies above `orange_floor`.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.red_floor > self.orange_floor
    }
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self::new(40_000, 30_000)
    }
}

/// Drawing style of one choropleth polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub fill_opacity: f64,
}

impl PolygonStyle {
    /// Style for a polygon of `class`: black 2px outline, half-opaque fill.
    #[must_use]
    pub fn for_class(class: ColorClass) -> Self {
        Self {
            fill_color: class.fill_color().to_string(),
            stroke_color: "black".to_string(),
            stroke_weight: 2,
            fill_opacity: 0.5,
        }
    }
}

/// A boundary polygon joined to its crime record.
///
/// Unmatched polygons carry `None` for both values and are classified as if
/// their count were zero.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedDistrict<'a> {
    pub geometry: &'a GeometryRecord,
    pub crime_count: Option<i64>,
    pub percent_change: Option<f64>,
    pub color_class: ColorClass,
    pub style: PolygonStyle,
}

impl JoinedDistrict<'_> {
    /// Boundary label of the district.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.geometry.district_name
    }

    /// Count used for display and classification; zero when unmatched.
    #[must_use]
    pub fn effective_count(&self) -> i64 {
        self.crime_count.unwrap_or(0)
    }

    /// Whether a crime record was found for this polygon.
    #[must_use]
    pub const fn matched(&self) -> bool {
        self.crime_count.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn color_class_round_trips_through_strings() {
        for &class in ColorClass::all() {
            assert_eq!(ColorClass::from_str(class.as_ref()).unwrap(), class);
            assert_eq!(class.to_string(), class.fill_color());
        }
    }

    #[test]
    fn default_thresholds_are_ordered() {
        let thresholds = ColorThresholds::default();
        assert_eq!(thresholds.red_floor, 40_000);
        assert_eq!(thresholds.orange_floor, 30_000);
        assert!(thresholds.is_ordered());
        assert!(!ColorThresholds::new(10, 10).is_ordered());
    }

    #[test]
    fn style_follows_class() {
        let style = PolygonStyle::for_class(ColorClass::Orange);
        assert_eq!(style.fill_color, "orange");
        assert_eq!(style.stroke_color, "black");
        assert_eq!(style.stroke_weight, 2);
        assert!((style.fill_opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn unmatched_district_counts_as_zero() {
        let geometry = GeometryRecord {
            district_name: "Unknown District".to_string(),
            normalized_name: "unknown district".to_string(),
            polygon: MultiPolygon(vec![]),
        };
        let joined = JoinedDistrict {
            geometry: &geometry,
            crime_count: None,
            percent_change: None,
            color_class: ColorClass::Green,
            style: PolygonStyle::for_class(ColorClass::Green),
        };
        assert_eq!(joined.name(), "Unknown District");
        assert_eq!(joined.effective_count(), 0);
        assert!(!joined.matched());
    }
}
