pub mod cli;
pub mod core;
pub mod providers;
pub mod service;
pub mod store;

use crate::core::clock::SystemClock;
use crate::core::config::AppConfig;
use crate::core::holdings::{GroupBy, HoldingsFilter, HoldingsView};
use crate::service::PortfolioService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Holdings {
        view: HoldingsView,
        group_by: GroupBy,
        filter: HoldingsFilter,
    },
    Goals,
    Transactions,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().context("No configuration found, run `folio setup` first")?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    show_cache_stats: bool,
) -> Result<()> {
    info!("folio starting...");
    let config = load_config(config_path)?;

    let source = providers::source_from_config(&config);
    let service = PortfolioService::new(source, &config.cache, Arc::new(SystemClock)).await;

    match command {
        AppCommand::Summary => cli::summary::run(&service).await?,
        AppCommand::Holdings {
            view,
            group_by,
            filter,
        } => cli::holdings::run(&service, &filter, view, group_by).await?,
        AppCommand::Goals => cli::goals::run(&service).await?,
        AppCommand::Transactions => cli::transactions::run(&service).await?,
    }

    if show_cache_stats {
        cli::cache::run(&service).await?;
    }
    Ok(())
}
