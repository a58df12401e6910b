//! Percentile scoring.
//!
//! The percentile is a logistic curve centered on the population mean and
//! scaled by the population standard deviation:
//!
//! ```text
//! percentile = 100 / (1 + e^(-(ppm - mu) / sigma))
//! ```
//!
//! It is a continuous approximation of rank, not an empirical percentile.
//! The result is neither clamped nor rounded.

use crate::stats::PopulationStats;

/// Score returned when the population has no spread.
pub const DEGENERATE_PERCENTILE: f64 = 50.0;

/// Map a reading onto the open interval (0, 100).
///
/// Returns [`DEGENERATE_PERCENTILE`] when `sigma` is zero, since every
/// reading then sits on the mean.
pub fn percentile(ppm: f64, stats: PopulationStats) -> f64 {
    if stats.is_degenerate() {
        return DEGENERATE_PERCENTILE;
    }
    100.0 / (1.0 + (-(ppm - stats.mu) / stats.sigma).exp())
}
