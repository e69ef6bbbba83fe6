//! Trailing moving average.

use crate::domain::{Metric, SeriesPoint};

/// Attach a trailing moving average of `metric` to every point.
///
/// Until a full window has accumulated (the first `window - 1` points) the
/// average is the raw value itself. After that it is
/// `floor(sum(window values) / window)`.
///
/// A window of 0 is treated as 1.
pub fn moving_average(series: &[SeriesPoint], metric: Metric, window: usize) -> Vec<SeriesPoint> {
    let window = window.max(1);
    let values: Vec<i128> = series.iter().map(|p| i128::from(p.value(metric))).collect();

    let mut out = Vec::with_capacity(series.len());
    // Wide accumulator: a window of large counts can exceed `i64`.
    let mut running: i128 = 0;

    for (i, point) in series.iter().enumerate() {
        running += values[i];
        if i >= window {
            running -= values[i - window];
        }

        let ma = if i + 1 < window {
            values[i]
        } else {
            // `div_euclid` floors for negative sums too (e.g. negative `active`).
            running.div_euclid(window as i128)
        };

        let mut smoothed = point.clone();
        // A mean of `i64` values fits in `i64`; clamp anyway.
        smoothed.moving_average = Some(i64::try_from(ma).unwrap_or(if ma < 0 { i64::MIN } else { i64::MAX }));
        out.push(smoothed);
    }

    out
}
