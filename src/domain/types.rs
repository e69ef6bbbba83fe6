//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - recomputed cheaply on every selector change
//! - exported to JSON/CSV
//! - rendered by either the CLI or the TUI front-end

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The literal selector entry meaning "sum over every region".
pub const GLOBAL_REGION: &str = "Global";

/// Region name used when a CSV row leaves the country column empty.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Which case count a chart (and its moving average / forecast) is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Confirmed,
        Metric::Deaths,
        Metric::Recovered,
        Metric::Active,
    ];

    /// Lowercase key, as used in CSV headers and exports.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
            Metric::Active => "active",
        }
    }

    /// Human-readable label for chart titles and legends.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed Cases",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
            Metric::Active => "Active Cases",
        }
    }

    /// Render color as a hex code.
    pub fn color_hex(self) -> &'static str {
        match self {
            Metric::Confirmed => "#ff7300",
            Metric::Deaths => "#ff4d4f",
            Metric::Recovered => "#52c41a",
            Metric::Active => "#1890ff",
        }
    }

    /// Render color as RGB components.
    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            Metric::Confirmed => (0xff, 0x73, 0x00),
            Metric::Deaths => (0xff, 0x4d, 0x4f),
            Metric::Recovered => (0x52, 0xc4, 0x1a),
            Metric::Active => (0x18, 0x90, 0xff),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Metric::Confirmed => Metric::Deaths,
            Metric::Deaths => Metric::Recovered,
            Metric::Recovered => Metric::Active,
            Metric::Active => Metric::Confirmed,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Metric::Confirmed => Metric::Active,
            Metric::Deaths => Metric::Confirmed,
            Metric::Recovered => Metric::Deaths,
            Metric::Active => Metric::Recovered,
        }
    }
}

/// Color of the moving-average line.
pub const MOVING_AVERAGE_COLOR_HEX: &str = "#666666";
pub const MOVING_AVERAGE_COLOR_RGB: (u8, u8, u8) = (0x66, 0x66, 0x66);

/// Which slice of the records a series is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionFilter {
    /// Sum every region per date.
    Global,
    /// Exact match on the record's `region`.
    Region(String),
}

impl RegionFilter {
    /// Parse a selector entry. `"Global"` (any case) selects the global sum.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(GLOBAL_REGION) {
            RegionFilter::Global
        } else {
            RegionFilter::Region(trimmed.to_string())
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            RegionFilter::Global => GLOBAL_REGION,
            RegionFilter::Region(name) => name,
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One raw parsed observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub region: String,
    pub subregion: String,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
}

/// The four case counts of a point, summed during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
}

impl Counts {
    pub fn add(&mut self, record: &Record) {
        self.confirmed = self.confirmed.saturating_add(record.confirmed);
        self.deaths = self.deaths.saturating_add(record.deaths);
        self.recovered = self.recovered.saturating_add(record.recovered);
        self.active = self.active.saturating_add(record.active);
    }
}

/// One aggregated, chart-ready row after grouping and date-sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
    /// Positional label (`"Week N"`), purely presentational.
    pub period_label: String,
    /// Present once smoothing has run.
    pub moving_average: Option<i64>,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, counts: Counts, period_label: String) -> Self {
        Self {
            date,
            confirmed: counts.confirmed,
            deaths: counts.deaths,
            recovered: counts.recovered,
            active: counts.active,
            period_label,
            moving_average: None,
        }
    }

    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
            Metric::Active => self.active,
        }
    }
}

/// One synthesized (non-observed) point. Only the selected metric is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub period_label: String,
    pub metric: Metric,
    pub value: i64,
}

/// A presentation row: observed points followed by forecast points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub period_label: String,
    pub value: i64,
    pub moving_average: Option<i64>,
    pub is_forecast: bool,
}

/// Explicit parameters for one computation pass.
///
/// The presentation layer owns the current selection; the core only ever sees
/// it as an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSelection {
    pub metric: Metric,
    pub region: RegionFilter,
    pub show_forecast: bool,
    pub window: usize,
    pub horizon: usize,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            metric: Metric::Confirmed,
            region: RegionFilter::Global,
            show_forecast: false,
            window: crate::series::DEFAULT_WINDOW,
            horizon: crate::series::DEFAULT_HORIZON,
        }
    }
}

/// Where raw CSV text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` / `https://` prefixes select a URL, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// A full run's configuration as understood by the front-ends.
///
/// This is derived from CLI flags (plus `.env` and defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: Option<DataSource>,
    pub seed: u64,
    pub selection: ViewSelection,
}
