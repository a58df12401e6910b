//! Error types for the server binary.
//!
//! [`StartupError`] wraps every failure that can stop the service before
//! it starts answering requests. Startup is fail-fast: the process exits
//! rather than serve partial reference data.

/// Top-level startup error.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hardness_core::ConfigError,
    },

    /// Reference data could not be loaded.
    #[error("reference data error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: hardness_core::StoreError,
    },

    /// The notifier could not be built.
    #[error("notifier error: {source}")]
    Notifier {
        /// The underlying notifier error.
        #[from]
        source: hardness_api::NotifierError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: hardness_api::ServerError,
    },
}
