//! Client configuration
//!
//! Sources, lowest to highest precedence: defaults, a JSON file, environment
//! variables, then whatever the caller applies on top (CLI flags).

mod env_loader;
mod file_loader;
mod logging_config;

pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::{DEFAULT_CONFIG_FILE, load_from_file};
pub use logging_config::{LogFormat, LoggingConfig};

use crate::cache::CacheConfig;
use crate::error::{ZeroPassError, ZeroPassResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroPassConfig {
    /// Base URL of the firewall simulator backend
    pub api_base_url: String,
    /// Timeout applied to every backend request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Hard limit for the connectivity probe
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Pause before the single retry after a stale rule-set reference
    #[serde(with = "humantime_serde")]
    pub stale_retry_delay: Duration,
    /// How often `rules watch` refreshes
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Default number of evaluation logs to fetch
    pub logs_limit: usize,
    /// Directory holding the durable client store
    pub data_dir: Option<PathBuf>,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl Default for ZeroPassConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            stale_retry_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(10),
            logs_limit: 100,
            data_dir: None,
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ZeroPassConfig {
    /// Defaults, then `path` (or `zeropass_config.json` in the working
    /// directory), then environment overrides. The result is validated.
    pub fn load(path: Option<&Path>) -> ZeroPassResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = load_from_file(path)?;
        apply_env_overrides(&mut config)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL, applying the same normalization as loading
    pub fn set_api_base_url(&mut self, url: impl Into<String>) {
        self.api_base_url = url.into();
        self.normalize();
    }

    /// Trim trailing slashes; fall back to the default for a blank URL
    pub fn normalize(&mut self) {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if trimmed.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Validate the configuration
    pub fn validate(&self) -> ZeroPassResult<()> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            ZeroPassError::config_with_context(
                format!("Invalid API base URL '{}': {}", self.api_base_url, e),
                "Validating api_base_url",
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ZeroPassError::config(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        for (name, value) in [
            ("request_timeout", self.request_timeout),
            ("probe_timeout", self.probe_timeout),
            ("poll_interval", self.poll_interval),
        ] {
            if value.is_zero() {
                return Err(ZeroPassError::config(format!("{} must be greater than zero", name)));
            }
        }

        if self.cache.persisted_ttl.is_zero() || self.cache.memory_ttl.is_zero() {
            return Err(ZeroPassError::config("Cache TTLs must be greater than zero"));
        }
        if self.logs_limit == 0 {
            return Err(ZeroPassError::config("logs_limit must be greater than zero"));
        }

        self.logging.validate()
    }
}
