use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

fn default_ttl_seconds() -> u64 {
    300
}

fn default_max_entry_mb() -> f64 {
    10.0
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_max_entry_mb")]
    pub max_entry_mb: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_seconds: default_ttl_seconds(),
            max_entry_mb: default_max_entry_mb(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn max_entry_bytes(&self) -> usize {
        (self.max_entry_mb.max(0.0) * 1024.0 * 1024.0) as usize
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// YAML file holding transactions and goals. Without one the portfolio
    /// is empty and lives in memory.
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "folio", "folio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Where `setup` points the data file by default.
    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "folio", "folio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("portfolio.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "/tmp/portfolio.yaml"
cache:
  ttl_seconds: 60
  max_entry_mb: 0.5
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/portfolio.yaml"));
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.max_entry_bytes(), 512 * 1024);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("cache: {}").unwrap();
        assert!(config.data_path.is_none());
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.cache.max_entry_bytes(), 10 * 1024 * 1024);

        let partial: AppConfig = serde_yaml::from_str("data_path: data.yaml").unwrap();
        assert_eq!(partial.cache, CacheConfig::default());
    }
}
