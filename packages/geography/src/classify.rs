//! Threshold-based color bucketing.

use crime_trends_geography_models::{ColorClass, ColorThresholds};

/// Red if `count` exceeds `red_floor`, else orange if it exceeds
/// `orange_floor`, else green.
///
/// Thresholds are used as given, even when misordered.
#[must_use]
pub const fn color_class(count: i64, thresholds: &ColorThresholds) -> ColorClass {
    if count > thresholds.red_floor {
        ColorClass::Red
    } else if count > thresholds.orange_floor {
        ColorClass::Orange
    } else {
        ColorClass::Green
    }
}

/// Logs a warning if `red_floor` does not lie above `orange_floor`.
pub fn warn_if_misordered(thresholds: &ColorThresholds) {
    if !thresholds.is_ordered() {
        log::warn!(
            "Red floor {} is not above orange floor {}; orange will never be assigned",
            thresholds.red_floor,
            thresholds.orange_floor
        );
    }
}
