//! Input/output helpers.
//!
//! - CSV ingest + row filtering (`ingest`)
//! - chart exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
