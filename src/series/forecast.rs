//! Linear trend extrapolation.
//!
//! The slope is a two-endpoint rate over the trailing `FORECAST_LOOKBACK`
//! points, not a least-squares fit. Each forecast step is one week.

use chrono::Duration;

use crate::domain::{ForecastPoint, Metric, SeriesPoint};

/// Number of trailing observed points the slope is computed from.
pub const FORECAST_LOOKBACK: usize = 10;

/// Calendar days between forecast steps.
const STEP_DAYS: i64 = 7;

/// Per-step rate of change over the trailing window, or `None` if the series
/// is shorter than `FORECAST_LOOKBACK`.
pub fn trend_slope(series: &[SeriesPoint], metric: Metric) -> Option<f64> {
    if series.len() < FORECAST_LOOKBACK {
        return None;
    }
    let tail = &series[series.len() - FORECAST_LOOKBACK..];
    let first = tail[0].value(metric) as f64;
    let last = tail[FORECAST_LOOKBACK - 1].value(metric) as f64;
    Some((last - first) / (FORECAST_LOOKBACK - 1) as f64)
}

/// Project `horizon` weekly points of `metric` past the end of `series`.
///
/// Returns an empty forecast when fewer than `FORECAST_LOOKBACK` points exist.
/// Predicted values are truncated to integers and clamped at zero.
pub fn linear_forecast(series: &[SeriesPoint], metric: Metric, horizon: usize) -> Vec<ForecastPoint> {
    let (Some(slope), Some(last)) = (trend_slope(series, metric), series.last()) else {
        return Vec::new();
    };
    let last_value = last.value(metric) as f64;

    let mut out = Vec::with_capacity(horizon);
    for k in 1..=horizon {
        let Some(date) = last
            .date
            .checked_add_signed(Duration::days(STEP_DAYS * k as i64))
        else {
            break;
        };

        let predicted = (last_value + slope * k as f64).floor().max(0.0);

        out.push(ForecastPoint {
            date,
            period_label: format!("Forecast {k}"),
            metric,
            value: predicted as i64,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Counts;
    use chrono::NaiveDate;

    fn series(values: &[i64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let counts = Counts {
                    confirmed: v,
                    deaths: 2 * v,
                    ..Counts::default()
                };
                SeriesPoint::new(
                    start + Duration::days(7 * i as i64),
                    counts,
                    crate::series::period_label(i),
                )
            })
            .collect()
    }

    #[test]
    fn short_series_produces_no_forecast() {
        let input = series(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(linear_forecast(&input, Metric::Confirmed, 10).is_empty());
        assert_eq!(trend_slope(&input, Metric::Confirmed), None);
    }

    #[test]
    fn extrapolates_from_trailing_endpoints() {
        // Only the last ten points matter: 100, 110, ..., 190 -> slope 10.
        let mut values = vec![5000, -5000];
        values.extend((0..10).map(|i| 100 + 10 * i));
        let input = series(&values);

        assert_eq!(trend_slope(&input, Metric::Confirmed), Some(10.0));

        let out = linear_forecast(&input, Metric::Confirmed, 3);
        let got: Vec<i64> = out.iter().map(|p| p.value).collect();
        assert_eq!(got, vec![200, 210, 220]);
        assert_eq!(out[0].period_label, "Forecast 1");
        assert_eq!(out[2].period_label, "Forecast 3");
        assert!(out.iter().all(|p| p.metric == Metric::Confirmed));
    }

    #[test]
    fn dates_advance_by_whole_weeks_from_last_observation() {
        let input = series(&[1; 10]);
        let last = input.last().unwrap().date;
        let out = linear_forecast(&input, Metric::Confirmed, 2);
        assert_eq!(out[0].date, last + Duration::days(7));
        assert_eq!(out[1].date, last + Duration::days(14));
    }

    #[test]
    fn values_are_clamped_at_zero() {
        let mut values = vec![1000];
        values.extend(std::iter::repeat(500).take(8));
        values.push(10);
        let input = series(&values);

        let out = linear_forecast(&input, Metric::Confirmed, 10);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|p| p.value >= 0));
        assert_eq!(out.last().unwrap().value, 0);
    }

    #[test]
    fn fractional_predictions_are_floored() {
        // slope = (10 - 0) / 9 = 1.11..
        let mut values = vec![0; 9];
        values.push(10);
        let input = series(&values);
        let out = linear_forecast(&input, Metric::Confirmed, 2);
        assert_eq!(out[0].value, 11);
        assert_eq!(out[1].value, 12);
    }

    #[test]
    fn selected_metric_drives_the_projection() {
        let input = series(&(1..=10).collect::<Vec<_>>());
        let confirmed = linear_forecast(&input, Metric::Confirmed, 1);
        let deaths = linear_forecast(&input, Metric::Deaths, 1);
        assert_eq!(confirmed[0].value, 11);
        assert_eq!(deaths[0].value, 22);
        assert_eq!(deaths[0].metric, Metric::Deaths);
    }

    #[test]
    fn zero_horizon_is_empty() {
        let input = series(&[1; 12]);
        assert!(linear_forecast(&input, Metric::Confirmed, 0).is_empty());
    }
}
