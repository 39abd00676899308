//! Configuration resolution and component wiring

use crate::args::Cli;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use zeropass_core::{
    ApiGateway, CacheStore, FileStore, IdentityProvider, KeyValueStore, MemoryStore,
    UnavailableStore, ZeroPassConfig,
};

/// File, then environment, then command-line flags
pub fn load_config(cli: &Cli) -> anyhow::Result<ZeroPassConfig> {
    let mut config = ZeroPassConfig::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, cli);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut ZeroPassConfig, cli: &Cli) {
    if let Some(url) = &cli.api_url {
        config.set_api_base_url(url.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    }
}

/// Configured data directory, else the platform data dir
pub fn resolve_data_dir(config: &ZeroPassConfig) -> Option<PathBuf> {
    config
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("zeropass")))
}

/// Every long-lived component, wired once per invocation
pub struct AppContext {
    pub config: ZeroPassConfig,
    pub durable: Arc<dyn KeyValueStore>,
    pub identity: Arc<IdentityProvider>,
    pub cache: Arc<CacheStore>,
    pub gateway: Arc<ApiGateway>,
}

impl AppContext {
    pub fn build(config: ZeroPassConfig) -> anyhow::Result<Self> {
        let durable: Arc<dyn KeyValueStore> = match resolve_data_dir(&config) {
            Some(dir) => Arc::new(FileStore::in_dir(dir)),
            None => {
                warn!("No data directory available, identity will not persist");
                Arc::new(UnavailableStore::new("no data directory"))
            }
        };
        // One invocation is one session
        let session_scope: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let identity = Arc::new(IdentityProvider::new(durable.clone(), session_scope));
        let cache = Arc::new(CacheStore::new(
            identity.clone(),
            durable.clone(),
            config.cache.clone(),
        ));
        let gateway = Arc::new(ApiGateway::new(&config, identity.clone(), cache.clone())?);

        Ok(Self {
            config,
            durable,
            identity,
            cache,
            gateway,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "zeropass",
            "--api-url",
            "https://fw.example.com/",
            "--data-dir",
            "/var/lib/zeropass",
            "-v",
            "recover",
        ])
        .unwrap();

        let mut config = ZeroPassConfig::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.api_base_url, "https://fw.example.com");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/zeropass")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_log_level_beats_verbose() {
        let cli =
            Cli::try_parse_from(["zeropass", "-v", "--log-level", "trace", "recover"]).unwrap();
        let mut config = ZeroPassConfig::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.logging.level, "trace");
    }

    #[tokio::test]
    async fn test_invocations_share_identity_through_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = ZeroPassConfig {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let first = AppContext::build(config.clone()).unwrap();
        let second = AppContext::build(config).unwrap();

        let a = first.identity.current().await;
        let b = second.identity.current().await;
        assert_eq!(a.id, b.id);
        assert_ne!(a.session_id, b.session_id);
    }
}
