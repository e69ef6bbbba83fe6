//! Time-series processing core.
//!
//! Responsibilities:
//!
//! - collapse records into one chronologically sorted series (`aggregate`)
//! - trailing moving average over a chosen metric (`smooth`)
//! - constant-slope projection from the trailing points (`forecast`)
//!
//! Every function here is pure: same inputs, same outputs, no hidden state.

pub mod aggregate;
pub mod forecast;
pub mod smooth;

pub use aggregate::*;
pub use forecast::*;
pub use smooth::*;

/// Default moving-average window (points).
pub const DEFAULT_WINDOW: usize = 5;

/// Default number of forecast steps.
pub const DEFAULT_HORIZON: usize = 10;
