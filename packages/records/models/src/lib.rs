#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-district yearly metric record types.
//!
//! A crime statistics table has one row per district and year, with one
//! numeric column per metric (total offenses, a specific offense type,
//! percent change from the previous year, ...). These types hold that table
//! in long form: one [`MetricRecord`] per cell.

use serde::{Deserialize, Serialize};

/// A single metric value for one district in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// District label exactly as it appears in the source table.
    pub district: String,
    /// Calendar year the value was recorded for.
    pub year: i32,
    /// Name of the metric column.
    pub metric_name: String,
    /// Recorded value.
    pub value: f64,
}

/// A `(year, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearValue {
    /// Calendar year.
    pub year: i32,
    /// Observed value.
    pub value: f64,
}

/// One district's history for one metric, ordered by ascending year.
///
/// Gaps between years are not detected here. Forecasts treat the series as
/// if it were contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSeries {
    /// District label.
    pub district: String,
    /// Metric name.
    pub metric_name: String,
    /// Observations, ascending by year.
    pub points: Vec<YearValue>,
}

impl DistrictSeries {
    /// Builds a series, sorting the points by year.
    #[must_use]
    pub fn new(
        district: impl Into<String>,
        metric_name: impl Into<String>,
        mut points: Vec<YearValue>,
    ) -> Self {
        points.sort_by_key(|p| p.year);
        Self {
            district: district.into(),
            metric_name: metric_name.into(),
            points,
        }
    }

    /// Returns the years of the series in order.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    /// Returns the values of the series in year order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Number of distinct years in the series.
    #[must_use]
    pub fn distinct_years(&self) -> usize {
        let mut years = self.years();
        years.dedup();
        years.len()
    }

    /// Last recorded year, if any.
    #[must_use]
    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Inclusive numeric range used to filter metric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that accepts every finite value.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_sorts_points_by_year() {
        let series = DistrictSeries::new(
            "Mitte",
            "total",
            vec![
                YearValue {
                    year: 2016,
                    value: 3.0,
                },
                YearValue {
                    year: 2014,
                    value: 1.0,
                },
                YearValue {
                    year: 2015,
                    value: 2.0,
                },
            ],
        );
        assert_eq!(series.years(), vec![2014, 2015, 2016]);
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last_year(), Some(2016));
    }

    #[test]
    fn distinct_years_ignores_repeats() {
        let points = [2014, 2014, 2015]
            .iter()
            .map(|&year| YearValue { year, value: 0.0 })
            .collect();
        let series = DistrictSeries::new("Mitte", "total", points);
        assert_eq!(series.len(), 3);
        assert_eq!(series.distinct_years(), 2);
    }

    #[test]
    fn value_range_is_inclusive() {
        let range = ValueRange::new(10.0, 20.0);
        assert!(range.contains(10.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(9.999));
        assert!(!range.contains(20.001));
        assert!(ValueRange::unbounded().contains(1.0e12));
    }
}
