//! Read-only record store with district, metric and year views.

use std::collections::BTreeSet;

use crime_trends_records_models::{DistrictSeries, MetricRecord, ValueRange, YearValue};

use crate::RecordError;

/// Parsed crime statistics table, stored as one [`MetricRecord`] per cell.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<MetricRecord>,
    metric_names: Vec<String>,
    districts: Vec<String>,
}

impl RecordStore {
    /// Builds a store from records, taking the metric order from the
    /// explicit `metric_names` list (the table's column order).
    ///
    /// Metrics that appear in `records` but not in `metric_names` are
    /// appended in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateRecord`] if two records share the same
    /// district, year and metric.
    pub fn new(
        mut metric_names: Vec<String>,
        records: Vec<MetricRecord>,
    ) -> Result<Self, RecordError> {
        let mut districts: Vec<String> = Vec::new();

        {
            let mut seen = BTreeSet::new();
            for record in &records {
                if !seen.insert((
                    record.district.as_str(),
                    record.year,
                    record.metric_name.as_str(),
                )) {
                    return Err(RecordError::DuplicateRecord {
                        district: record.district.clone(),
                        year: record.year,
                        metric: record.metric_name.clone(),
                    });
                }

                if !metric_names.contains(&record.metric_name) {
                    metric_names.push(record.metric_name.clone());
                }
                if !districts.contains(&record.district) {
                    districts.push(record.district.clone());
                }
            }
        }

        log::debug!(
            "Record store holds {} values for {} districts and {} metrics",
            records.len(),
            districts.len(),
            metric_names.len()
        );

        Ok(Self {
            records,
            metric_names,
            districts,
        })
    }

    /// Builds a store from records, ordering metrics by first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateRecord`] on duplicate cells.
    pub fn from_records(records: Vec<MetricRecord>) -> Result<Self, RecordError> {
        Self::new(Vec::new(), records)
    }

    /// Unique district labels in first-appearance order.
    #[must_use]
    pub fn districts(&self) -> &[String] {
        &self.districts
    }

    /// Metric names in table column order. The district and year key
    /// columns are never included.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metric_names
    }

    /// All records in load order.
    #[must_use]
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Returns the history of one district for one metric.
    ///
    /// Years whose cell for `metric` was empty are absent from the series.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the district has no rows at all
    /// or the metric is not a column of the table.
    pub fn series(&self, district: &str, metric: &str) -> Result<DistrictSeries, RecordError> {
        if !self.districts.iter().any(|d| d == district) {
            return Err(RecordError::NotFound {
                kind: "district",
                name: district.to_string(),
            });
        }
        self.require_metric(metric)?;

        let points = self
            .records
            .iter()
            .filter(|r| r.district == district && r.metric_name == metric)
            .map(|r| YearValue {
                year: r.year,
                value: r.value,
            })
            .collect();

        Ok(DistrictSeries::new(district, metric, points))
    }

    /// Records of `metric` for `year` whose value lies in `range`
    /// (inclusive on both ends).
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the metric is unknown.
    pub fn filter(
        &self,
        year: i32,
        range: ValueRange,
        metric: &str,
    ) -> Result<Vec<&MetricRecord>, RecordError> {
        self.require_metric(metric)?;

        Ok(self
            .records
            .iter()
            .filter(|r| r.year == year && r.metric_name == metric && range.contains(r.value))
            .collect())
    }

    /// All records of `metric` for `year`, unfiltered by value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the metric is unknown.
    pub fn records_for_year(
        &self,
        year: i32,
        metric: &str,
    ) -> Result<Vec<&MetricRecord>, RecordError> {
        self.filter(year, ValueRange::unbounded(), metric)
    }

    /// Distinct years present in the table, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn require_metric(&self, metric: &str) -> Result<(), RecordError> {
        if self.metric_names.iter().any(|m| m == metric) {
            Ok(())
        } else {
            Err(RecordError::NotFound {
                kind: "metric",
                name: metric.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(district: &str, year: i32, metric: &str, value: f64) -> MetricRecord {
        MetricRecord {
            district: district.to_string(),
            year,
            metric_name: metric.to_string(),
            value,
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(
            vec!["total".to_string(), "change".to_string()],
            vec![
                record("Mitte", 2015, "total", 120.0),
                record("Mitte", 2014, "total", 100.0),
                record("Mitte", 2015, "change", 20.0),
                record("Pankow", 2014, "total", 50.0),
                record("Pankow", 2015, "total", 45.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lists_districts_and_metrics_in_order() {
        let store = sample_store();
        assert_eq!(store.districts(), ["Mitte", "Pankow"]);
        assert_eq!(store.metrics(), ["total", "change"]);
        assert_eq!(store.years(), vec![2014, 2015]);
    }

    #[test]
    fn series_is_sorted_by_year() {
        let store = sample_store();
        let series = store.series("Mitte", "total").unwrap();
        assert_eq!(series.years(), vec![2014, 2015]);
        assert_eq!(series.values(), vec![100.0, 120.0]);
    }

    #[test]
    fn series_skips_missing_cells() {
        let store = sample_store();
        let series = store.series("Pankow", "change").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn unknown_district_is_not_found() {
        let store = sample_store();
        let err = store.series("Spandau", "total").unwrap_err();
        assert!(matches!(err, RecordError::NotFound { kind: "district", .. }));
    }

    #[test]
    fn unknown_metric_is_not_found() {
        let store = sample_store();
        let err = store.series("Mitte", "arson").unwrap_err();
        assert!(matches!(err, RecordError::NotFound { kind: "metric", .. }));
        assert!(store.filter(2014, ValueRange::unbounded(), "arson").is_err());
    }

    #[test]
    fn filter_uses_inclusive_range_and_year() {
        let store = sample_store();
        let hits = store
            .filter(2015, ValueRange::new(45.0, 119.0), "total")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].district, "Pankow");

        let hits = store
            .filter(2015, ValueRange::new(45.0, 120.0), "total")
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn rejects_duplicate_cells() {
        let err = RecordStore::from_records(vec![
            record("Mitte", 2014, "total", 1.0),
            record("Mitte", 2014, "total", 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, RecordError::DuplicateRecord { year: 2014, .. }));
    }

    #[test]
    fn from_records_orders_metrics_by_first_appearance() {
        let store = RecordStore::from_records(vec![
            record("Mitte", 2014, "b", 1.0),
            record("Mitte", 2014, "a", 2.0),
        ])
        .unwrap();
        assert_eq!(store.metrics(), ["b", "a"]);
    }
}
