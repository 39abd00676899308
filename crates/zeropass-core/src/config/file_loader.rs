//! File-based configuration loading

use super::ZeroPassConfig;
use crate::error::{ZeroPassError, ZeroPassResult};
use std::fs;
use std::path::Path;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "zeropass_config.json";

/// Load configuration from a JSON file.
///
/// Returns the default config if the file doesn't exist.
pub fn load_from_file(path: &Path) -> ZeroPassResult<ZeroPassConfig> {
    if !path.exists() {
        return Ok(ZeroPassConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ZeroPassError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ZeroPassError::config_with_context(
            format!("Failed to parse JSON config: {}", e),
            format!("Deserializing JSON configuration from '{}'", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("zeropass_config.json");
        fs::write(
            &config_path,
            r#"{
                "api_base_url": "https://zeropass.internal",
                "stale_retry_delay": "250ms",
                "cache": { "persisted_ttl": "5s" },
                "logging": { "level": "debug", "format": "json" }
            }"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.api_base_url, "https://zeropass.internal");
        assert_eq!(config.stale_retry_delay, Duration::from_millis(250));
        assert_eq!(config.cache.persisted_ttl, Duration::from_secs(5));
        assert_eq!(config.cache.memory_ttl, Duration::from_secs(30));
        assert_eq!(config.logging.level, "debug");
        // Unspecified fields keep their defaults
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ZeroPassConfig::default());
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ api_base_url: ").unwrap();

        let err = load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, ZeroPassError::Config { .. }));
    }
}
