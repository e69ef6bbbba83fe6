//! Formatted terminal output for the non-interactive subcommands.
//!
//! We keep formatting code in one place so:
//! - the series code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::ChartView;
use crate::data::LoadedData;
use crate::domain::{ChartRow, MOVING_AVERAGE_COLOR_HEX};
use crate::report::summarize;

/// Format the run summary (data source + selection + headline numbers).
pub fn format_view_summary(loaded: &LoadedData, view: &ChartView) -> String {
    let mut out = String::new();

    out.push_str("=== COVID-19 Time Series & Forecasting ===\n");
    out.push_str(&format!("{}\n", loaded.dataset.source_note()));
    match (&loaded.origin, &loaded.fallback_reason) {
        (Some(origin), _) => out.push_str(&format!("Source: {origin}\n")),
        (None, Some(reason)) => out.push_str(&format!("Source: synthetic ({reason})\n")),
        (None, None) => out.push_str("Source: synthetic\n"),
    }
    if !loaded.dropped.is_empty() {
        out.push_str(&format!(
            "Rows: read={} kept={} dropped={}\n",
            loaded.rows_read,
            loaded.dataset.record_count(),
            loaded.dropped.len()
        ));
    }

    out.push('\n');
    out.push_str(&format!("{}\n", view.title()));
    out.push_str(&format!(
        "Metric: {} ({}) | moving average window: {} ({})\n",
        view.metric().label(),
        view.metric().color_hex(),
        view.selection.window,
        MOVING_AVERAGE_COLOR_HEX
    ));

    let Some(summary) = summarize(view) else {
        out.push_str("No data for this selection.\n");
        return out;
    };

    out.push_str(&format!(
        "Points: n={} | dates=[{}, {}]\n",
        summary.observed_points, summary.first_date, summary.last_date
    ));
    out.push_str(&format!(
        "Latest: {} (moving average {})\n",
        fmt_count(summary.latest_value),
        summary
            .latest_moving_average
            .map(fmt_count)
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "Peak: {} on {}\n",
        fmt_count(summary.peak_value),
        summary.peak_date
    ));

    if view.selection.show_forecast {
        match summary.forecast_end {
            Some((date, value)) => out.push_str(&format!(
                "Forecast: {} steps, ending {} on {date}\n",
                view.forecast.len(),
                fmt_count(value)
            )),
            None => out.push_str("Forecast: not enough history (need 10 points)\n"),
        }
    }

    out
}

/// Format chart rows as a fixed-width table.
///
/// `limit` keeps only the last N rows (0 = all).
pub fn format_rows_table(rows: &[ChartRow], limit: usize) -> String {
    let start = if limit == 0 { 0 } else { rows.len().saturating_sub(limit) };

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<12} {:>14} {:>14} {:<8}\n",
            "date", "period", "value", "moving_avg", "kind"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<14} {:-<14} {:-<8}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in &rows[start..] {
        out.push_str(
            format!(
                "{:<12} {:<12} {:>14} {:>14} {:<8}\n",
                r.date.to_string(),
                truncate(&r.period_label, 12),
                fmt_count(r.value),
                r.moving_average.map(fmt_count).unwrap_or_default(),
                if r.is_forecast { "forecast" } else { "observed" },
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the region selector entries, one per line.
pub fn format_regions(regions: &[String]) -> String {
    let mut out = String::new();
    for r in regions {
        out.push_str(r);
        out.push('\n');
    }
    out
}

/// Thousands-separated integer, e.g. `1234567` -> `1,234,567`.
pub fn fmt_count(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
