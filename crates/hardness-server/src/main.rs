//! Water hardness lookup service entry point.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `HARDNESS_CONFIG` (must exist when set) or
//!    `hardness-config.yaml` (optional)
//! 2. Initialize structured logging (tracing)
//! 3. Load both reference JSON files and build the city index
//! 4. Compute population statistics
//! 5. Build the lookup notifier
//! 6. Serve the lookup API until shutdown
//!
//! Any failure before step 6 aborts the process.

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use hardness_api::{AppState, Notifier};
use hardness_core::config::{LoggingConfig, DEFAULT_CONFIG_PATH};
use hardness_core::{ReferenceStore, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, reference data, or the server fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let explicit = std::env::var_os("HARDNESS_CONFIG").map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = ServiceConfig::load(explicit.as_deref())
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_logging(&config.logging);

    info!(
        config_path = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        "hardness-server starting"
    );

    run(config).await.context("hardness-server failed")?;

    info!("hardness-server shutdown complete");
    Ok(())
}

/// Load reference data, assemble state, and serve until shutdown.
async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let store = ReferenceStore::load(&config.data.hardness_path, &config.data.city_index_path)?;
    info!(
        hardness_path = %config.data.hardness_path.display(),
        city_index_path = %config.data.city_index_path.display(),
        records = store.record_count(),
        postal_codes = store.postal_code_count(),
        cities = store.city_count(),
        "Reference data loaded"
    );

    let notifier = Notifier::from_config(&config.notifier)?;
    info!(
        enabled = notifier.is_enabled(),
        timeout_ms = config.notifier.timeout_ms,
        excluded = config.notifier.excluded_pincodes.len(),
        "Lookup notifier configured"
    );

    let state = AppState::new(store, notifier)?;
    info!(
        mu_final = state.stats.mu,
        sigma = state.stats.sigma,
        "Population statistics computed"
    );
    if state.stats.is_degenerate() {
        tracing::warn!("Population has no spread, every percentile will be 50");
    }

    if config.cors.allows_any() {
        tracing::warn!("CORS allows any origin; set cors.allowed_origins to restrict");
    }

    hardness_api::start_server(&config.server, &config.cors, Arc::new(state)).await?;
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
