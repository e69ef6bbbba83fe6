//! Data-source loading with synthetic fallback.
//!
//! The loader reads CSV text from a local file or an HTTP(S) URL. Any failure
//! to obtain the text (missing file, network error, non-success status) is not
//! surfaced as an error: it is logged and the synthetic series is used instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::data::synthetic::generate_series;
use crate::domain::{DataSource, Record, RegionFilter, SeriesPoint};
use crate::io::ingest::{DroppedRow, parse_records};
use crate::series::{aggregate, regions};

/// Environment variable that supplies the default source (also read from `.env`).
pub const SOURCE_ENV_VAR: &str = "COVID_DASH_SOURCE";

/// Path tried when neither `--source` nor the environment names a source.
pub const DEFAULT_SOURCE_PATH: &str = "data/covid_19_clean_complete.csv";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The raw data the presentation layer retains between recomputations.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// Records parsed from a real CSV.
    Observed(Vec<Record>),
    /// A pre-aggregated synthetic series (global only).
    Synthetic(Vec<SeriesPoint>),
}

impl Dataset {
    /// Selector entries, `"Global"` first.
    pub fn regions(&self) -> Vec<String> {
        match self {
            Dataset::Observed(records) => regions(records),
            Dataset::Synthetic(_) => regions(&[]),
        }
    }

    /// The aggregated series for one region selection.
    pub fn series_for(&self, region: &RegionFilter) -> Vec<SeriesPoint> {
        match (self, region) {
            (Dataset::Observed(records), _) => aggregate(records, region),
            (Dataset::Synthetic(series), RegionFilter::Global) => series.clone(),
            (Dataset::Synthetic(_), RegionFilter::Region(_)) => Vec::new(),
        }
    }

    /// Number of raw rows (records, or synthetic points).
    pub fn record_count(&self) -> usize {
        match self {
            Dataset::Observed(records) => records.len(),
            Dataset::Synthetic(series) => series.len(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Dataset::Synthetic(_))
    }

    /// One-line description of where the data came from.
    pub fn source_note(&self) -> String {
        match self {
            Dataset::Observed(records) => format!("Using real dataset with {} records", records.len()),
            Dataset::Synthetic(_) => "Using simulated data for demonstration".to_string(),
        }
    }
}

/// Loader output: the dataset plus what happened while loading it.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    /// The source that was read, or `None` when the synthetic fallback is in use.
    pub origin: Option<DataSource>,
    pub rows_read: usize,
    pub dropped: Vec<DroppedRow>,
    /// Why the fallback was used (if it was).
    pub fallback_reason: Option<String>,
}

/// Resolve the configured source: explicit flag, then `COVID_DASH_SOURCE`
/// (including `.env`), then the default path if it exists.
pub fn resolve_source(explicit: Option<&str>) -> Option<DataSource> {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        return Some(DataSource::parse(raw));
    }

    dotenvy::dotenv().ok();
    if let Ok(raw) = std::env::var(SOURCE_ENV_VAR) {
        if !raw.trim().is_empty() {
            return Some(DataSource::parse(&raw));
        }
    }

    let default = PathBuf::from(DEFAULT_SOURCE_PATH);
    default.exists().then_some(DataSource::File(default))
}

/// Load a dataset, falling back to the synthetic series on any fetch failure.
pub fn load_dataset(source: Option<&DataSource>, seed: u64) -> LoadedData {
    let Some(source) = source else {
        info!("no data source configured, using synthetic data");
        return fallback(seed, "no data source configured".to_string());
    };

    let text = match fetch_text(source) {
        Ok(text) => text,
        Err(reason) => {
            warn!(%source, %reason, "data source unavailable, using synthetic data");
            return fallback(seed, reason);
        }
    };

    let ingested = parse_records(&text);
    info!(
        %source,
        records = ingested.records.len(),
        dropped = ingested.dropped.len(),
        "loaded CSV data"
    );

    LoadedData {
        dataset: Dataset::Observed(ingested.records),
        origin: Some(source.clone()),
        rows_read: ingested.rows_read,
        dropped: ingested.dropped,
        fallback_reason: None,
    }
}

fn fallback(seed: u64, reason: String) -> LoadedData {
    let series = generate_series(seed);
    LoadedData {
        rows_read: series.len(),
        dataset: Dataset::Synthetic(series),
        origin: None,
        dropped: Vec::new(),
        fallback_reason: Some(reason),
    }
}

fn fetch_text(source: &DataSource) -> Result<String, String> {
    match source {
        DataSource::File(path) => read_file(path),
        DataSource::Url(url) => fetch_url(url),
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
}

fn fetch_url(url: &str) -> Result<String, String> {
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| format!("request failed: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("request failed with status {}", resp.status()));
    }

    resp.text().map_err(|e| format!("failed to read response body: {e}"))
}
