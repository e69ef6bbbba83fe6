//! Shared "view pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> aggregate -> moving average -> (forecast) -> chart rows
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::Dataset;
use crate::domain::{ChartRow, ForecastPoint, Metric, SeriesPoint, ViewSelection};
use crate::series::{linear_forecast, moving_average};

/// All computed outputs of a single view recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub selection: ViewSelection,
    /// Observed series with moving averages attached.
    pub series: Vec<SeriesPoint>,
    /// Empty unless the forecast is toggled on and enough history exists.
    pub forecast: Vec<ForecastPoint>,
    /// `series` followed by `forecast`, reduced to the selected metric.
    pub rows: Vec<ChartRow>,
}

impl ChartView {
    pub fn metric(&self) -> Metric {
        self.selection.metric
    }

    /// Chart heading, e.g. `"Deaths Over Time - Italy (with Forecast)"`.
    pub fn title(&self) -> String {
        let mut title = format!(
            "{} Over Time - {}",
            self.selection.metric.label(),
            self.selection.region
        );
        if self.selection.show_forecast {
            title.push_str(" (with Forecast)");
        }
        title
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last observed point, if any.
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.series.last()
    }
}

/// Recompute the full view from the retained dataset.
pub fn build_view(dataset: &Dataset, selection: &ViewSelection) -> ChartView {
    let aggregated = dataset.series_for(&selection.region);
    let series = moving_average(&aggregated, selection.metric, selection.window);

    let forecast = if selection.show_forecast {
        linear_forecast(&aggregated, selection.metric, selection.horizon)
    } else {
        Vec::new()
    };

    let rows = chart_rows(&series, &forecast, selection.metric);

    ChartView {
        selection: selection.clone(),
        series,
        forecast,
        rows,
    }
}

/// Concatenate observed and forecast points into presentation rows.
pub fn chart_rows(series: &[SeriesPoint], forecast: &[ForecastPoint], metric: Metric) -> Vec<ChartRow> {
    let observed = series.iter().map(|p| ChartRow {
        date: p.date,
        period_label: p.period_label.clone(),
        value: p.value(metric),
        moving_average: p.moving_average,
        is_forecast: false,
    });
    let projected = forecast.iter().map(|f| ChartRow {
        date: f.date,
        period_label: f.period_label.clone(),
        value: f.value,
        moving_average: None,
        is_forecast: true,
    });
    observed.chain(projected).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, RegionFilter};
    use chrono::NaiveDate;

    fn records() -> Vec<Record> {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let mut out = Vec::new();
        for i in 0..12 {
            for (region, scale) in [("Italy", 10), ("Spain", 20)] {
                out.push(Record {
                    date: start + chrono::Duration::days(i),
                    region: region.to_string(),
                    subregion: String::new(),
                    confirmed: scale * (i + 1),
                    deaths: i,
                    recovered: 0,
                    active: 0,
                });
            }
        }
        out
    }

    #[test]
    fn forecast_rows_follow_observed_rows() {
        let dataset = Dataset::Observed(records());
        let selection = ViewSelection {
            show_forecast: true,
            horizon: 3,
            ..ViewSelection::default()
        };
        let view = build_view(&dataset, &selection);

        assert_eq!(view.series.len(), 12);
        assert_eq!(view.forecast.len(), 3);
        assert_eq!(view.rows.len(), 15);
        assert!(view.rows[..12].iter().all(|r| !r.is_forecast && r.moving_average.is_some()));
        assert!(view.rows[12..].iter().all(|r| r.is_forecast && r.moving_average.is_none()));
        assert_eq!(view.rows[0].value, 30);
        assert_eq!(view.rows[12].period_label, "Forecast 1");
        // Global confirmed grows by 30 per day; next step continues the line.
        assert_eq!(view.rows[12].value, 390);
    }

    #[test]
    fn forecast_toggle_off_yields_only_observed_rows() {
        let dataset = Dataset::Observed(records());
        let view = build_view(&dataset, &ViewSelection::default());
        assert!(view.forecast.is_empty());
        assert_eq!(view.rows.len(), 12);
        assert_eq!(view.title(), "Confirmed Cases Over Time - Global");
    }

    #[test]
    fn region_and_metric_selection_flow_through() {
        let dataset = Dataset::Observed(records());
        let selection = ViewSelection {
            metric: Metric::Deaths,
            region: RegionFilter::Region("Spain".to_string()),
            show_forecast: true,
            ..ViewSelection::default()
        };
        let view = build_view(&dataset, &selection);
        assert_eq!(view.title(), "Deaths Over Time - Spain (with Forecast)");
        let values: Vec<i64> = view.rows.iter().take(3).map(|r| r.value).collect();
        assert_eq!(values, vec![0, 1, 2]);
        assert!(view.forecast.iter().all(|f| f.metric == Metric::Deaths));
    }

    #[test]
    fn unknown_region_gives_empty_view() {
        let dataset = Dataset::Observed(records());
        let selection = ViewSelection {
            region: RegionFilter::Region("Atlantis".to_string()),
            show_forecast: true,
            ..ViewSelection::default()
        };
        let view = build_view(&dataset, &selection);
        assert!(view.is_empty());
        assert!(view.latest().is_none());
    }

    #[test]
    fn recomputation_is_identical() {
        let dataset = Dataset::Observed(records());
        let selection = ViewSelection {
            show_forecast: true,
            ..ViewSelection::default()
        };
        assert_eq!(build_view(&dataset, &selection), build_view(&dataset, &selection));
    }
}
