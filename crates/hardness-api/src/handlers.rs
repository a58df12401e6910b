//! REST endpoint handlers for the lookup API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/water-check?pincode=...` | Hardness reading and percentile |
//! | `GET` | `/health` | Liveness and reference data counts |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use hardness_core::{percentile, resolve};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// Unit reported alongside every reading.
pub const HARDNESS_UNIT: &str = "ppm";

// ---------------------------------------------------------------------------
// Query parameter and response structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /water-check`.
#[derive(Debug, serde::Deserialize)]
pub struct WaterCheckQuery {
    /// Postal code to look up. Treated as an opaque key.
    pub pincode: Option<String>,
}

/// One element of the `GET /water-check` response array.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaterCheckResponse {
    /// Resolved city.
    pub city: String,
    /// Postal code as requested.
    pub pincode: String,
    /// Resolved hardness in ppm.
    pub wasserhaerte_avg: f64,
    /// Always [`HARDNESS_UNIT`].
    #[serde(rename = "Hardness-unit")]
    pub hardness_unit: String,
    /// Population mean.
    pub mu_final: f64,
    /// Population standard deviation.
    pub sigma: f64,
    /// Same value as `wasserhaerte_avg`.
    pub h_ppm: f64,
    /// Logistic percentile of the reading.
    pub hardness_percentile: f64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is answering.
    pub status: &'static str,
    /// Number of hardness records.
    pub records: usize,
    /// Number of postal codes in the city index.
    pub postal_codes: usize,
    /// Number of distinct cities.
    pub cities: usize,
    /// Population mean.
    pub mu_final: f64,
    /// Population standard deviation.
    pub sigma: f64,
    /// Whether lookups are reported to a receiver.
    pub notifier_enabled: bool,
}

// ---------------------------------------------------------------------------
// GET /water-check
// ---------------------------------------------------------------------------

/// Resolve a postal code, score it, and report the lookup.
///
/// Responds with a single-element array on success, or 404
/// `{"detail": "No fallback available"}` when no tier produced a reading.
#[allow(clippy::unused_async)] // axum handlers must be async
pub async fn water_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WaterCheckQuery>,
) -> Result<Json<Vec<WaterCheckResponse>>, ApiError> {
    let pincode = query.pincode.ok_or(ApiError::MissingParameter("pincode"))?;

    let resolution = resolve(&state.store, &pincode).inspect_err(|e| {
        info!(pincode, reason = %e, "lookup unresolved");
    })?;

    let score = percentile(resolution.ppm, state.stats);

    debug!(
        pincode,
        tier = resolution.tier.as_str(),
        source = resolution.source_postal_code,
        ppm = resolution.ppm,
        percentile = score,
        "lookup resolved"
    );

    let outcome = state
        .notifier
        .notify(&pincode, resolution.city, resolution.ppm);
    debug!(pincode, ?outcome, "lookup notification");

    Ok(Json(vec![WaterCheckResponse {
        city: resolution.city.to_owned(),
        pincode,
        wasserhaerte_avg: resolution.ppm,
        hardness_unit: HARDNESS_UNIT.to_owned(),
        mu_final: state.stats.mu,
        sigma: state.stats.sigma,
        h_ppm: resolution.ppm,
        hardness_percentile: score,
    }]))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness and the size of the loaded reference data.
#[allow(clippy::unused_async)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: state.store.record_count(),
        postal_codes: state.store.postal_code_count(),
        cities: state.store.city_count(),
        mu_final: state.stats.mu,
        sigma: state.stats.sigma,
        notifier_enabled: state.notifier.is_enabled(),
    })
}
