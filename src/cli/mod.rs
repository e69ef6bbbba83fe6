//! Command-line parsing for the COVID-19 dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the series/processing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Metric, RegionFilter, ViewSelection};
use crate::io::export::ExportFormat;
use crate::series::{DEFAULT_HORIZON, DEFAULT_WINDOW};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "covid-dash",
    version,
    about = "COVID-19 time series & forecasting dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive terminal dashboard.
    Tui(ViewArgs),
    /// Print a summary, an ASCII plot, and optionally a table of the series.
    Show(ShowArgs),
    /// List the selectable regions ("Global" first).
    Regions(SourceArgs),
    /// Write the current series (plus forecast) to CSV or JSON.
    Export(ExportArgs),
}

/// Where the data comes from, plus logging.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// CSV file path or http(s) URL. Falls back to `COVID_DASH_SOURCE`, then
    /// `data/covid_19_clean_complete.csv`, then synthetic data.
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Seed for the synthetic fallback series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Append log output to this file (the TUI logs nowhere otherwise).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Source options plus the view selection.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Metric to chart.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Confirmed)]
    pub metric: Metric,

    /// Country/region to chart ("Global" sums every region).
    #[arg(short = 'c', long, default_value = "Global")]
    pub country: String,

    /// Append a linear forecast.
    #[arg(short = 'f', long)]
    pub forecast: bool,

    /// Moving-average window (points).
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Forecast horizon (weekly steps).
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,
}

impl ViewArgs {
    pub fn selection(&self) -> ViewSelection {
        ViewSelection {
            metric: self.metric,
            region: RegionFilter::parse(&self.country),
            show_forecast: self.forecast,
            window: self.window,
            horizon: self.horizon,
        }
    }
}

/// Options for `show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Print the last N rows as a table (0 prints none).
    #[arg(long, default_value_t = 0)]
    pub table: usize,
}

/// Options for `export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output path.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}
