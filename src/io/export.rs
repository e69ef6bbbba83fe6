//! Export the current chart rows to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::ChartView;
use crate::domain::{ChartRow, Metric};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// One flattened CSV row.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: NaiveDate,
    period_label: &'a str,
    metric: &'a str,
    value: i64,
    moving_average: Option<i64>,
    is_forecast: bool,
}

/// A saved view (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    pub tool: String,
    pub metric: Metric,
    pub region: String,
    pub title: String,
    pub source: String,
    pub rows: Vec<ChartRow>,
}

/// Write the view to `path` in the requested format.
pub fn write_view(path: &Path, view: &ChartView, source_note: &str, format: ExportFormat) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export file '{}': {e}", path.display())))?;

    match format {
        ExportFormat::Csv => write_rows_csv(file, view),
        ExportFormat::Json => write_view_json(file, view, source_note),
    }
}

/// Write chart rows as CSV with a header line.
pub fn write_rows_csv<W: Write>(writer: W, view: &ChartView) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let metric = view.metric().key();

    for row in &view.rows {
        wtr.serialize(CsvRow {
            date: row.date,
            period_label: &row.period_label,
            metric,
            value: row.value,
            moving_average: row.moving_average,
            is_forecast: row.is_forecast,
        })
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    // An empty view still gets a header line.
    if view.rows.is_empty() {
        wtr.write_record(["date", "period_label", "metric", "value", "moving_average", "is_forecast"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the view as pretty JSON.
pub fn write_view_json<W: Write>(writer: W, view: &ChartView, source_note: &str) -> Result<(), AppError> {
    let file = ExportFile {
        tool: "covid-dash".to_string(),
        metric: view.metric(),
        region: view.selection.region.to_string(),
        title: view.title(),
        source: source_note.to_string(),
        rows: view.rows.clone(),
    };

    serde_json::to_writer_pretty(writer, &file)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_view;
    use crate::data::{Dataset, generate_series};
    use crate::domain::ViewSelection;

    fn view(show_forecast: bool) -> ChartView {
        let dataset = Dataset::Synthetic(generate_series(9));
        let selection = ViewSelection {
            show_forecast,
            horizon: 2,
            ..ViewSelection::default()
        };
        build_view(&dataset, &selection)
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let v = view(true);
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &v).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,period_label,metric,value,moving_average,is_forecast");
        assert_eq!(lines.len(), v.rows.len() + 1);
        assert!(lines[1].starts_with("2020-01-22,Week 1,confirmed,"));
        assert!(lines[1].ends_with(",false"));
        let last = lines.last().unwrap();
        assert!(last.contains(",Forecast 2,confirmed,"));
        // Forecast rows have no moving average.
        assert!(last.ends_with(",,true"));
    }

    #[test]
    fn empty_view_still_writes_header() {
        let dataset = Dataset::Synthetic(generate_series(9));
        let selection = ViewSelection {
            region: crate::domain::RegionFilter::Region("Nowhere".to_string()),
            ..ViewSelection::default()
        };
        let v = build_view(&dataset, &selection);
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &v).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,period_label,metric,value,moving_average,is_forecast\n"
        );
    }

    #[test]
    fn json_round_trips_rows() {
        let v = view(false);
        let mut buf = Vec::new();
        write_view_json(&mut buf, &v, "Using simulated data for demonstration").unwrap();
        let parsed: ExportFile = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.tool, "covid-dash");
        assert_eq!(parsed.metric, Metric::Confirmed);
        assert_eq!(parsed.region, "Global");
        assert_eq!(parsed.rows, v.rows);
    }
}
