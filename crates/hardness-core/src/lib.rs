//! Core lookup logic for the water hardness service.
//!
//! This crate holds everything that does not touch HTTP:
//!
//! - [`store`] -- the immutable [`ReferenceStore`] built from the two
//!   reference JSON files (postal code to reading, postal code to city)
//!   plus the derived city index
//! - [`stats`] -- [`PopulationStats`] (mean and population standard
//!   deviation over every non-null reading)
//! - [`resolver`] -- the three-tier fallback that maps any postal code
//!   to a best-available reading
//! - [`scorer`] -- the logistic percentile transform
//! - [`config`] -- typed service configuration loaded from YAML with
//!   environment overrides
//!
//! Everything here is built once at startup and read-only afterwards, so
//! the API layer can share it behind an [`std::sync::Arc`] without locks.

pub mod config;
pub mod resolver;
pub mod scorer;
pub mod stats;
pub mod store;

pub use config::{ConfigError, ServiceConfig};
pub use resolver::{resolve, Resolution, ResolutionTier, ResolveError};
pub use scorer::percentile;
pub use stats::PopulationStats;
pub use store::{HardnessRecord, ReferenceStore, StoreError};
