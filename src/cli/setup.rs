use crate::core::config::{AppConfig, CacheConfig};
use anyhow::{Context, Result};
use std::path::Path;

const CONFIG_HEADER: &str = "# Configuration file for folio
#
# data_path: YAML file with `transactions` (spreadsheet rows) and `goals`.
#            Remove it to run against an empty in-memory portfolio.
# cache:     TTL and per-entry size ceiling of the dataset cache.
";

/// Default config text, pointing the data file at `data_path`.
pub fn default_config(data_path: &Path) -> Result<String> {
    let config = AppConfig {
        data_path: Some(data_path.display().to_string()),
        cache: CacheConfig::default(),
    };
    let body = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    Ok(format!("{CONFIG_HEADER}{body}"))
}

/// Creates a default configuration file at the default location
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path, &AppConfig::default_data_path()?)
}

/// Creates a default configuration file at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P, data_path: &Path) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, default_config(data_path)?)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
