//! Shared application state for the lookup API.

use hardness_core::{PopulationStats, ReferenceStore, StoreError};

use crate::notifier::Notifier;

/// Shared state for the Axum application.
///
/// Built once at startup, wrapped in [`std::sync::Arc`] and injected via
/// Axum's `State` extractor. Every field is read-only afterwards.
#[derive(Debug)]
pub struct AppState {
    /// Reference readings and the city index.
    pub store: ReferenceStore,
    /// Mean and standard deviation over every non-null reading.
    pub stats: PopulationStats,
    /// Outbound lookup reporting.
    pub notifier: Notifier,
}

impl AppState {
    /// Assemble the state, computing population statistics from the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyPopulation`] when the store has no
    /// non-null reading.
    pub fn new(store: ReferenceStore, notifier: Notifier) -> Result<Self, StoreError> {
        let stats = PopulationStats::from_store(&store)?;
        Ok(Self {
            store,
            stats,
            notifier,
        })
    }
}
