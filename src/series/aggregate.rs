//! Record aggregation into a single chart series.
//!
//! Both modes group rows by calendar date and sum the four counts; region mode
//! filters to one country first, so province-level rows roll up into the
//! country total for that date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{Counts, GLOBAL_REGION, Record, RegionFilter, SeriesPoint};

/// Points per `"Week N"` bucket.
const POINTS_PER_PERIOD: usize = 7;

/// Collapse records into one series sorted by date.
///
/// An unknown region yields an empty series.
pub fn aggregate(records: &[Record], region: &RegionFilter) -> Vec<SeriesPoint> {
    // Keyed by `NaiveDate`, so iteration order is chronological.
    let mut by_date: BTreeMap<NaiveDate, Counts> = BTreeMap::new();

    let selected = records.iter().filter(|r| match region {
        RegionFilter::Global => true,
        RegionFilter::Region(name) => r.region == *name,
    });
    for record in selected {
        by_date.entry(record.date).or_default().add(record);
    }

    by_date
        .into_iter()
        .enumerate()
        .map(|(idx, (date, counts))| SeriesPoint::new(date, counts, period_label(idx)))
        .collect()
}

/// Positional label: seven consecutive points share one "week".
///
/// The calendar spacing between points is ignored.
pub fn period_label(index: usize) -> String {
    format!("Week {}", index / POINTS_PER_PERIOD + 1)
}

/// Selector entries: `"Global"` followed by every distinct region, sorted.
pub fn regions(records: &[Record]) -> Vec<String> {
    let distinct: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();

    let mut out = Vec::with_capacity(distinct.len() + 1);
    out.push(GLOBAL_REGION.to_string());
    out.extend(distinct.into_iter().map(str::to_string));
    out
}
