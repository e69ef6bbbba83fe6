//! Reporting utilities: headline statistics and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::NaiveDate;

use crate::app::pipeline::ChartView;

/// Headline numbers for the selected metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub observed_points: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub latest_value: i64,
    pub latest_moving_average: Option<i64>,
    pub peak_value: i64,
    pub peak_date: NaiveDate,
    /// Value of the final forecast step, if a forecast was produced.
    pub forecast_end: Option<(NaiveDate, i64)>,
}

/// Summarize the observed part of a view. `None` for an empty view.
pub fn summarize(view: &ChartView) -> Option<SeriesSummary> {
    let metric = view.metric();
    let first = view.series.first()?;
    let last = view.series.last()?;

    // Earliest date wins on ties.
    let peak = view
        .series
        .iter()
        .fold(first, |best, p| if p.value(metric) > best.value(metric) { p } else { best });

    Some(SeriesSummary {
        observed_points: view.series.len(),
        first_date: first.date,
        last_date: last.date,
        latest_value: last.value(metric),
        latest_moving_average: last.moving_average,
        peak_value: peak.value(metric),
        peak_date: peak.date,
        forecast_end: view.forecast.last().map(|f| (f.date, f.value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_view;
    use crate::data::Dataset;
    use crate::domain::{Record, RegionFilter, ViewSelection};

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let values = [5, 9, 9, 4, 12, 12, 3, 1, 0, 2, 6];
        Dataset::Observed(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Record {
                    date: start + chrono::Duration::days(i as i64),
                    region: "Peru".to_string(),
                    subregion: String::new(),
                    confirmed: v,
                    deaths: 0,
                    recovered: 0,
                    active: 0,
                })
                .collect(),
        )
    }

    #[test]
    fn summary_reports_latest_and_first_peak() {
        let selection = ViewSelection {
            show_forecast: true,
            horizon: 4,
            ..ViewSelection::default()
        };
        let view = build_view(&dataset(), &selection);
        let s = summarize(&view).unwrap();

        assert_eq!(s.observed_points, 11);
        assert_eq!(s.latest_value, 6);
        assert_eq!(s.peak_value, 12);
        assert_eq!(s.peak_date, NaiveDate::from_ymd_opt(2020, 5, 5).unwrap());
        // (3 + 1 + 0 + 2 + 6) / 5
        assert_eq!(s.latest_moving_average, Some(2));
        let (end_date, _) = s.forecast_end.unwrap();
        assert_eq!(end_date, NaiveDate::from_ymd_opt(2020, 6, 8).unwrap());
    }

    #[test]
    fn empty_view_has_no_summary() {
        let selection = ViewSelection {
            region: RegionFilter::Region("Chile".to_string()),
            ..ViewSelection::default()
        };
        assert!(summarize(&build_view(&dataset(), &selection)).is_none());
    }
}
