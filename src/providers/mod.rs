//! Data source implementations.

pub mod memory;
pub mod util;
pub mod yaml_file;

use crate::core::config::AppConfig;
use crate::core::source::DataSource;
use std::sync::Arc;
use tracing::info;

pub use memory::MemorySource;
pub use yaml_file::YamlFileSource;

/// Picks the data source named by the config. Without a data file the
/// service runs against an empty in-memory source.
pub fn source_from_config(config: &AppConfig) -> Arc<dyn DataSource> {
    match &config.data_path {
        Some(path) => {
            info!("Using data file {path}");
            Arc::new(YamlFileSource::new(path))
        }
        None => {
            info!("No data_path configured, using an empty in-memory source");
            Arc::new(MemorySource::new())
        }
    }
}
