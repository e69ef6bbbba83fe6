//! `covid-dash` library crate.
//!
//! The binary (`covid-dash`) is a thin wrapper around this library so that:
//!
//! - ingestion, aggregation, smoothing and forecasting are testable without
//!   spawning processes or drawing a terminal
//! - the same view pipeline feeds the TUI, the `show` report and `export`

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
