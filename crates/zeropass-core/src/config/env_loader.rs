//! Environment variable overrides

use super::ZeroPassConfig;
use crate::error::{ZeroPassError, ZeroPassResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Apply `ZEROPASS_*` variables from the process environment
pub fn apply_env_overrides(config: &mut ZeroPassConfig) -> ZeroPassResult<()> {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides using `lookup` in place of the process environment
///
/// Recognized names: `ZEROPASS_API_URL`, `ZEROPASS_DATA_DIR`,
/// `ZEROPASS_LOG_LEVEL` and `ZEROPASS_CACHE_TTL` (sets both tiers; plain
/// seconds or a humantime string such as `"20s"`).
pub fn apply_overrides_from<F>(config: &mut ZeroPassConfig, lookup: F) -> ZeroPassResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("ZEROPASS_API_URL") {
        config.set_api_base_url(url);
    }

    if let Some(dir) = lookup("ZEROPASS_DATA_DIR").filter(|d| !d.trim().is_empty()) {
        config.data_dir = Some(PathBuf::from(dir));
    }

    if let Some(level) = lookup("ZEROPASS_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(raw) = lookup("ZEROPASS_CACHE_TTL") {
        let ttl = parse_duration(&raw).ok_or_else(|| {
            ZeroPassError::config(format!("Invalid ZEROPASS_CACHE_TTL value: '{}'", raw))
        })?;
        config.cache = config.cache.clone().with_ttl(ttl);
    }

    Ok(())
}

fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    humantime_serde::re::humantime::parse_duration(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ZeroPassConfig::default();
        config.api_base_url = "http://from-file:8000".to_string();

        apply_overrides_from(
            &mut config,
            lookup(&[
                ("ZEROPASS_API_URL", "http://from-env:9000/"),
                ("ZEROPASS_DATA_DIR", "/tmp/zeropass"),
                ("ZEROPASS_LOG_LEVEL", "trace"),
                ("ZEROPASS_CACHE_TTL", "20"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://from-env:9000");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/zeropass")));
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.cache.persisted_ttl, Duration::from_secs(20));
        assert_eq!(config.cache.memory_ttl, Duration::from_secs(20));
    }

    #[test]
    fn test_unset_variables_leave_config_untouched() {
        let mut config = ZeroPassConfig::default();
        apply_overrides_from(&mut config, lookup(&[])).unwrap();
        assert_eq!(config, ZeroPassConfig::default());
    }

    #[test]
    fn test_cache_ttl_accepts_humantime() {
        let mut config = ZeroPassConfig::default();
        apply_overrides_from(&mut config, lookup(&[("ZEROPASS_CACHE_TTL", "1m 30s")])).unwrap();
        assert_eq!(config.cache.persisted_ttl, Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_cache_ttl_is_rejected() {
        let mut config = ZeroPassConfig::default();
        let err =
            apply_overrides_from(&mut config, lookup(&[("ZEROPASS_CACHE_TTL", "soon")])).unwrap_err();
        assert!(err.to_string().contains("ZEROPASS_CACHE_TTL"));
    }
}
