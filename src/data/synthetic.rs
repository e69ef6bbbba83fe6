//! Synthetic weekly case series, used when no real CSV can be loaded.
//!
//! The shape is deterministic (a linear ramp in confirmed cases with deaths and
//! recoveries as fixed fractions of it); the noise on top is drawn from a
//! seeded RNG so the same seed always yields the same series.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{Counts, SeriesPoint};

/// Number of weekly points generated.
pub const SYNTHETIC_POINTS: usize = 100;

const START: (i32, u32, u32) = (2020, 1, 22);
const STEP_DAYS: i64 = 7;

const BASE_CONFIRMED: f64 = 1000.0;
const CONFIRMED_PER_WEEK: f64 = 150.0;
const CONFIRMED_NOISE: f64 = 500.0;
const DEATH_RATE: f64 = 0.02;
const DEATH_NOISE: f64 = 10.0;
const RECOVERY_RATE: f64 = 0.85;
const RECOVERY_NOISE: f64 = 100.0;

/// Generate the fallback series.
///
/// Labels are one `"Week N"` per point, since every point is already a week apart.
pub fn generate_series(seed: u64) -> Vec<SeriesPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Constant, always a valid calendar date.
    let start = NaiveDate::from_ymd_opt(START.0, START.1, START.2).unwrap_or_default();

    (0..SYNTHETIC_POINTS)
        .map(|i| {
            let confirmed =
                (BASE_CONFIRMED + i as f64 * CONFIRMED_PER_WEEK + rng.gen_range(0.0..CONFIRMED_NOISE)).floor();
            let deaths = (confirmed * DEATH_RATE + rng.gen_range(0.0..DEATH_NOISE)).floor();
            let recovered = (confirmed * RECOVERY_RATE + rng.gen_range(0.0..RECOVERY_NOISE)).floor();

            let counts = Counts {
                confirmed: confirmed as i64,
                deaths: deaths as i64,
                recovered: recovered as i64,
                active: (confirmed - deaths - recovered) as i64,
            };

            SeriesPoint::new(
                start + Duration::days(STEP_DAYS * i as i64),
                counts,
                format!("Week {}", i + 1),
            )
        })
        .collect()
}
