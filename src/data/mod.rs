//! Data acquisition.
//!
//! - CSV loading from a file or URL with fallback (`source`)
//! - seeded synthetic weekly series (`synthetic`)

pub mod source;
pub mod synthetic;

pub use source::{Dataset, LoadedData, load_dataset, resolve_source};
pub use synthetic::generate_series;
