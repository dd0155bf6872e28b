//! Name-based join of boundary polygons to crime records.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crime_trends_geography_models::{ColorThresholds, GeometryRecord, JoinedDistrict, PolygonStyle};
use crime_trends_records_models::MetricRecord;

use crate::classify::{color_class, warn_if_misordered};
use crate::normalize::normalize;

/// Indexes `records` by normalized district label. The first record for a
/// label wins; later ones are reported.
fn index_by_name<'r>(
    records: &[&'r MetricRecord],
    what: &str,
) -> HashMap<String, &'r MetricRecord> {
    let mut index = HashMap::with_capacity(records.len());

    for &record in records {
        match index.entry(normalize(&record.district)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(slot) => {
                log::warn!(
                    "Duplicate {what} for district key '{}': keeping '{}', ignoring '{}'",
                    slot.key(),
                    slot.get().district,
                    record.district
                );
            }
        }
    }

    index
}

/// Joins every polygon to its crime count and percent change.
///
/// `counts` are the records shown on the map (already filtered by year and
/// value range). `percent_changes` are looked up by the same normalized name
/// for matched polygons only. A polygon with no matching count keeps `None`
/// for both values and is classified as a count of zero.
///
/// The output has one entry per polygon, in polygon order.
#[must_use]
pub fn join<'a>(
    polygons: &'a [GeometryRecord],
    counts: &[&MetricRecord],
    percent_changes: &[&MetricRecord],
    thresholds: &ColorThresholds,
) -> Vec<JoinedDistrict<'a>> {
    warn_if_misordered(thresholds);

    let count_index = index_by_name(counts, "count");
    let change_index = index_by_name(percent_changes, "percent change");

    let joined: Vec<JoinedDistrict<'a>> = polygons
        .iter()
        .map(|geometry| {
            let matched = count_index.get(&geometry.normalized_name);

            #[allow(clippy::cast_possible_truncation)]
            let crime_count = matched.map(|r| r.value.round_ties_even() as i64);
            let percent_change = matched.and_then(|_| {
                change_index
                    .get(&geometry.normalized_name)
                    .map(|r| r.value)
            });

            if matched.is_none() {
                log::debug!("No record for district '{}'", geometry.district_name);
            }

            let class = color_class(crime_count.unwrap_or(0), thresholds);
            JoinedDistrict {
                geometry,
                crime_count,
                percent_change,
                color_class: class,
                style: PolygonStyle::for_class(class),
            }
        })
        .collect();

    log::info!(
        "Joined {} of {} district polygons to records",
        joined.iter().filter(|j| j.matched()).count(),
        joined.len()
    );

    joined
}
