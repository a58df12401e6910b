//! Population statistics over the reference readings.

use crate::store::{ReferenceStore, StoreError};

/// Mean and population standard deviation of every non-null reading.
///
/// Computed once at startup and passed by value to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PopulationStats {
    /// Arithmetic mean of the readings.
    pub mu: f64,
    /// Population standard deviation (divisor is the count, not count - 1).
    pub sigma: f64,
}

impl PopulationStats {
    /// Compute statistics from a sequence of readings.
    ///
    /// Returns `None` when the sequence is empty.
    #[allow(clippy::cast_precision_loss)] // reading counts are far below 2^52
    pub fn from_readings(readings: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = readings.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mu = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / n;
        Some(Self {
            mu,
            sigma: variance.sqrt(),
        })
    }

    /// Compute statistics over all non-null readings in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyPopulation`] when no record has a reading.
    pub fn from_store(store: &ReferenceStore) -> Result<Self, StoreError> {
        Self::from_readings(store.readings()).ok_or(StoreError::EmptyPopulation)
    }

    /// Whether the spread is too small to scale by (all readings equal).
    pub const fn is_degenerate(self) -> bool {
        !(self.sigma > 0.0 && self.sigma.is_finite())
    }
}
