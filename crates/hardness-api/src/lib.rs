//! Lookup API server for the water hardness service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`GET /water-check?pincode=...`** -- resolves a postal code to a
//!   hardness reading, scores it against the population, and reports the
//!   lookup to the configured receiver
//! - **`GET /health`** -- liveness plus reference data counts
//!
//! # Architecture
//!
//! The reference store and population statistics are built once by the
//! binary and handed to [`AppState`], which every handler reads through an
//! [`std::sync::Arc`]. Nothing is mutated after startup, so no locks are
//! involved. Lookup notifications are dispatched on their own Tokio task
//! and never hold up the response.

pub mod error;
pub mod handlers;
pub mod notifier;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use notifier::{LookupNotification, Notifier, NotifierError, NotifyOutcome};
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
