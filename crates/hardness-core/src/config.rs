//! Configuration loading and typed config structures for the hardness service.
//!
//! The configuration lives in `hardness-config.yaml` in the working
//! directory (or wherever `HARDNESS_CONFIG` points). Every field has a
//! default, so the file itself is optional. Deployment-specific values can
//! be overridden from the environment without touching the YAML:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `HARDNESS_HOST` | `server.host` |
//! | `HARDNESS_PORT` | `server.port` |
//! | `HARDNESS_DATA_PATH` | `data.hardness_path` |
//! | `CITY_INDEX_PATH` | `data.city_index_path` |
//! | `NOTIFIER_URL` | `notifier.url` (empty string disables) |
//! | `NOTIFIER_TIMEOUT_MS` | `notifier.timeout_ms` |
//! | `CORS_ALLOWED_ORIGINS` | `cors.allowed_origins` (comma separated) |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "hardness-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {message}")]
    InvalidOverride {
        /// Name of the environment variable.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `hardness-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Reference data file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Outbound lookup notification settings.
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Cross-origin settings.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a malformed environment value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides apply either way.
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file).
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load the configuration for startup.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read if present and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if `explicit` cannot be read, otherwise
    /// see [`from_file`](Self::from_file).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
        }
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for a malformed numeric value.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for a malformed numeric value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HARDNESS_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("HARDNESS_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::InvalidOverride {
                var: "HARDNESS_PORT",
                message: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("HARDNESS_DATA_PATH") {
            self.data.hardness_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("CITY_INDEX_PATH") {
            self.data.city_index_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("NOTIFIER_URL") {
            self.notifier.url = Some(val).filter(|url| !url.trim().is_empty());
        }
        if let Some(val) = lookup("NOTIFIER_TIMEOUT_MS") {
            self.notifier.timeout_ms = val.parse().map_err(|e| ConfigError::InvalidOverride {
                var: "NOTIFIER_TIMEOUT_MS",
                message: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = val
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Locations of the two reference JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Postal code to `{ppm, city}` file.
    #[serde(default = "default_hardness_path")]
    pub hardness_path: PathBuf,

    /// Postal code to city file.
    #[serde(default = "default_city_index_path")]
    pub city_index_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            hardness_path: default_hardness_path(),
            city_index_path: default_city_index_path(),
        }
    }
}

/// Outbound notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotifierConfig {
    /// Receiver URL. `None` disables notifications.
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_notifier_timeout_ms")]
    pub timeout_ms: u64,

    /// Postal codes that are never reported.
    #[serde(default = "default_excluded_pincodes")]
    pub excluded_pincodes: Vec<String>,
}

impl NotifierConfig {
    /// Timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_notifier_timeout_ms(),
            excluded_pincodes: default_excluded_pincodes(),
        }
    }
}

/// Cross-origin resource sharing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty, or a single `"*"`, allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Whether every origin is allowed.
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_hardness_path() -> PathBuf {
    PathBuf::from("pincode_water_hardness.json")
}

fn default_city_index_path() -> PathBuf {
    PathBuf::from("pincode_to_city.json")
}

const fn default_notifier_timeout_ms() -> u64 {
    5_000
}

fn default_excluded_pincodes() -> Vec<String> {
    vec!["400001".to_owned()]
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.notifier.timeout(), Duration::from_secs(5));
        assert_eq!(config.notifier.excluded_pincodes, vec!["400001"]);
        assert!(config.notifier.url.is_none());
        assert!(config.cors.allows_any());
        assert_eq!(
            config.data.hardness_path,
            PathBuf::from("pincode_water_hardness.json")
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9090

data:
  hardness_path: "/srv/data/hardness.json"
  city_index_path: "/srv/data/cities.json"

notifier:
  url: "https://example.com/log"
  timeout_ms: 1500
  excluded_pincodes: ["400001", "000000"]

cors:
  allowed_origins: ["https://app.example.com"]

logging:
  level: "debug"
  json: true
"#;
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.data.city_index_path, PathBuf::from("/srv/data/cities.json"));
        assert_eq!(config.notifier.url.as_deref(), Some("https://example.com/log"));
        assert_eq!(config.notifier.timeout_ms, 1500);
        assert_eq!(config.notifier.excluded_pincodes.len(), 2);
        assert!(!config.cors.allows_any());
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ServiceConfig::parse("server:\n  port: 8081\n").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.notifier.excluded_pincodes, vec!["400001"]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/hardness-config.yaml");
        assert!(matches!(
            ServiceConfig::load(Some(path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn implicit_missing_file_falls_back_to_defaults() {
        let config = ServiceConfig::load_or_default(Path::new("/nonexistent/hardness-config.yaml"))
            .unwrap();
        assert_eq!(config.notifier.excluded_pincodes, vec!["400001"]);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            ServiceConfig::parse("server: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn overrides_replace_yaml_values() {
        let vars: HashMap<&str, &str> = [
            ("HARDNESS_PORT", "7000"),
            ("NOTIFIER_URL", "https://hooks.example.com/x"),
            ("NOTIFIER_TIMEOUT_MS", "250"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example ,"),
            ("CITY_INDEX_PATH", "cities.json"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.notifier.url.as_deref(), Some("https://hooks.example.com/x"));
        assert_eq!(config.notifier.timeout_ms, 250);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.data.city_index_path, PathBuf::from("cities.json"));
    }

    #[test]
    fn empty_notifier_url_disables() {
        let mut config = ServiceConfig::default();
        config.notifier.url = Some("https://example.com".to_owned());
        config
            .apply_overrides(|name| (name == "NOTIFIER_URL").then(String::new))
            .unwrap();
        assert!(config.notifier.url.is_none());
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(|name| (name == "HARDNESS_PORT").then(|| "eighty".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { var: "HARDNESS_PORT", .. }));
    }
}
