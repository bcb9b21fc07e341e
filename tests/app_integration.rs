use anyhow::Result;
use chrono::NaiveDate;
use folio::core::clock::FixedClock;
use folio::core::config::{AppConfig, CacheConfig};
use folio::core::holdings::{GroupBy, HoldingsFilter, HoldingsView};
use folio::core::source::DataSource;
use folio::core::transaction::TransactionRecord;
use folio::providers::{MemorySource, YamlFileSource, source_from_config};
use folio::service::{PortfolioService, TRANSACTIONS_KEY};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use super::*;

    pub fn write_config(dir: &Path, data_file: &str, data: &str) -> Result<String> {
        let data_path = dir.join(data_file);
        fs::write(&data_path, data)?;
        let config_path = dir.join("config.yaml");
        fs::write(
            &config_path,
            format!(
                "data_path: \"{}\"\ncache:\n  ttl_seconds: 300\n  max_entry_mb: 10\n",
                data_path.display()
            ),
        )?;
        Ok(config_path.display().to_string())
    }

    pub async fn service_for(config_path: &str) -> Result<PortfolioService> {
        let config = AppConfig::load_from_path(config_path)?;
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        Ok(PortfolioService::new(source_from_config(&config), &config.cache, clock).await)
    }
}

const UNREALIZED: &str = r#"
transactions:
  - ID: txn_1
    Account: Retirement
    AssetType: Equity
    TranType: Invest
    Realised: "FALSE"
    Security: Index Fund
    BuyDate: "2023-01-01"
    BuyValue: "₹1,00,000"
    CurrentValue: "1,10,000"
goals:
  - id: goal_1
    name: Retirement
    targetAmount: 220000
    targetDate: "2040-01-01"
"#;

const REALIZED: &str = r#"
transactions:
  - ID: txn_2
    Account: Investment
    AssetType: Equity
    TranType: Trade
    Realised: "TRUE"
    Security: Bank Stock
    BuyDate: "2022-01-01"
    SellDate: "2023-01-01"
    BuyValue: 50000
    SellValue: 60000
    Gain/Loss: 10000
"#;

const PARTLY_BROKEN: &str = r##"
transactions:
  - ID: txn_3
    Account: Investment
    AssetType: Equity
    TranType: SIP
    Realised: "FALSE"
    Security: Index Fund
    BuyDate: "01/01/2023"
    BuyValue: 100000
    CurrentValue: 110000
  - ID: txn_4
    Account: Investment
    AssetType: Equity
    TranType: SIP
    Realised: "FALSE"
    Security: Index Fund
    BuyDate: "#N/A"
    BuyValue: 5000
    CurrentValue: "-"
"##;

#[test_log::test(tokio::test)]
async fn test_unrealized_position_summary() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = test_utils::write_config(dir.path(), "data.yaml", UNREALIZED)?;
    let service = test_utils::service_for(&config_path).await?;

    let summary = service.portfolio_summary().await;
    info!(?summary, "Summary for a single open position");
    assert_eq!(summary.total_invested, 100000.0);
    assert_eq!(summary.total_value, 110000.0);
    assert_eq!(summary.unrealized_pl, 10000.0);
    let rate = summary.xirr.expect("xirr should be computable");
    assert!((rate - 10.0).abs() < 0.5, "rate = {rate}");

    let goals = service.goals_with_progress().await;
    assert_eq!(goals[0].current_value, 110000.0);
    assert_eq!(goals[0].progress, 50.0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_realized_position_holding() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = test_utils::write_config(dir.path(), "data.yaml", REALIZED)?;
    let service = test_utils::service_for(&config_path).await?;

    let holdings = service
        .holdings(
            &HoldingsFilter::default(),
            HoldingsView::Realized,
            GroupBy::Security,
        )
        .await;
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].name, "Bank Stock");
    assert_eq!(holdings[0].realized_pl, 10000.0);
    assert_eq!(holdings[0].dividends, 0.0);
    assert_eq!(holdings[0].xirr, None);

    let summary = service.portfolio_summary().await;
    assert_eq!(summary.realized_pl, 10000.0);
    let rate = summary.realized_xirr.expect("realized xirr");
    assert!((rate - 20.0).abs() < 0.5, "rate = {rate}");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_unparseable_date_is_tolerated() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = test_utils::write_config(dir.path(), "data.yaml", PARTLY_BROKEN)?;
    let service = test_utils::service_for(&config_path).await?;

    let holdings = service
        .holdings(
            &HoldingsFilter {
                asset_class: Some("Equity".to_string()),
                account: None,
            },
            HoldingsView::Unrealized,
            GroupBy::Security,
        )
        .await;
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].current_value, 110000.0);
    let rate = holdings[0].xirr.expect("xirr from the valid transaction");
    assert!((rate - 10.0).abs() < 0.5, "rate = {rate}");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_oversized_dataset_is_never_cached() -> Result<()> {
    let txns: Vec<TransactionRecord> = (0..200)
        .map(|i| TransactionRecord {
            id: format!("txn_{i}"),
            security: format!("Fund {i}"),
            asset_class: "Equity".to_string(),
            buy_date: "2023-01-01".to_string(),
            invested: 1000.0,
            current_value: 1100.0,
            ..Default::default()
        })
        .collect();
    let config = CacheConfig {
        ttl_seconds: 300,
        max_entry_mb: 0.01,
    };
    let clock = Arc::new(FixedClock::at_date(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ));
    let service =
        PortfolioService::new(Arc::new(MemorySource::with_data(txns, vec![])), &config, clock)
            .await;

    let summary = service.portfolio_summary().await;
    assert_eq!(summary.total_invested, 200000.0);
    service.portfolio_summary().await;

    let stats = service.cache_stats().await;
    let key = &stats.keys[TRANSACTIONS_KEY];
    assert_eq!(key.hits, 0);
    assert_eq!(key.misses, 2);
    assert!(!key.cached);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_writes_reach_the_data_file() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = test_utils::write_config(dir.path(), "data.yaml", UNREALIZED)?;
    let service = test_utils::service_for(&config_path).await?;
    assert_eq!(service.portfolio_summary().await.total_invested, 100000.0);

    service.delete_transaction("txn_1").await?;
    assert_eq!(service.portfolio_summary().await.total_invested, 0.0);

    let reread = YamlFileSource::new(dir.path().join("data.yaml"));
    assert!(reread.fetch_transactions().await?.is_empty());
    assert_eq!(reread.fetch_goals().await?.len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_run_command_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = test_utils::write_config(dir.path(), "data.yaml", UNREALIZED)?;

    folio::run_command(folio::AppCommand::Summary, Some(&config_path), true).await?;
    folio::run_command(
        folio::AppCommand::Holdings {
            view: HoldingsView::Unrealized,
            group_by: GroupBy::Account,
            filter: HoldingsFilter::default(),
        },
        Some(&config_path),
        false,
    )
    .await?;
    folio::run_command(folio::AppCommand::Goals, Some(&config_path), false).await?;
    folio::run_command(folio::AppCommand::Transactions, Some(&config_path), false).await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.yaml");
    let result = folio::run_command(
        folio::AppCommand::Summary,
        Some(&missing.display().to_string()),
        false,
    )
    .await;
    assert!(result.is_err());
}
