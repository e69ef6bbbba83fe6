//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the metric and region selectors (`Metric`, `RegionFilter`)
//! - parsed observations (`Record`) and chart-ready rows (`SeriesPoint`)
//! - forecast and presentation rows (`ForecastPoint`, `ChartRow`)

pub mod types;

pub use types::*;
