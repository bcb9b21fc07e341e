use super::util::{remove_by_id, replace_by_id};
use crate::core::goals::Goal;
use crate::core::source::DataSource;
use crate::core::transaction::{RawTransactionRow, TransactionRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// On-disk layout of the data file. Transactions are stored in the
/// spreadsheet row shape so that exported sheets can be pasted in as-is.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DataFile {
    transactions: Vec<RawTransactionRow>,
    goals: Vec<Goal>,
}

/// A data source backed by a single YAML file.
///
/// A missing file reads as an empty portfolio and is created on the first
/// write. Writes rewrite the whole file under a lock.
pub struct YamlFileSource {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<DataFile> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Data file {} not found, starting empty", self.path.display());
                return Ok(DataFile::default());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read data file: {}", self.path.display())
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(DataFile::default());
        }
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse data file: {}", self.path.display()))
    }

    async fn save(&self, data: &DataFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let text = serde_yaml::to_string(data).context("Failed to serialize data file")?;
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("Failed to write data file: {}", self.path.display()))
    }

    /// Loads the file, applies `change` and writes the result back.
    async fn modify(&self, change: impl FnOnce(&mut DataFile) -> Result<()> + Send) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;
        change(&mut data)?;
        self.save(&data).await
    }
}

#[async_trait]
impl DataSource for YamlFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>> {
        let data = self.load().await?;
        debug!(
            "Read {} transaction rows from {}",
            data.transactions.len(),
            self.path.display()
        );
        Ok(data
            .transactions
            .iter()
            .filter(|row| {
                let usable = row.has_usable_quantity();
                if !usable {
                    warn!(id = ?row.id, quantity = ?row.quantity, "Skipping row with a non-numeric quantity");
                }
                usable
            })
            .map(TransactionRecord::from)
            .collect())
    }

    async fn write_transaction(&self, txn: &TransactionRecord) -> Result<()> {
        let row = RawTransactionRow::from(txn);
        self.modify(move |data| {
            data.transactions.push(row);
            Ok(())
        })
        .await
    }

    async fn update_transaction(&self, id: &str, txn: &TransactionRecord) -> Result<()> {
        let row = RawTransactionRow::from(txn);
        self.modify(|data| {
            replace_by_id(&mut data.transactions, id, row, "Transaction", row_id)
        })
        .await
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.modify(|data| remove_by_id(&mut data.transactions, id, "Transaction", row_id))
            .await
    }

    async fn fetch_goals(&self) -> Result<Vec<Goal>> {
        Ok(self.load().await?.goals)
    }

    async fn write_goal(&self, goal: &Goal) -> Result<()> {
        let goal = goal.clone();
        self.modify(move |data| {
            data.goals.push(goal);
            Ok(())
        })
        .await
    }

    async fn update_goal(&self, id: &str, goal: &Goal) -> Result<()> {
        let goal = goal.clone();
        self.modify(|data| replace_by_id(&mut data.goals, id, goal, "Goal", |g| g.id.clone()))
            .await
    }

    async fn delete_goal(&self, id: &str) -> Result<()> {
        self.modify(|data| remove_by_id(&mut data.goals, id, "Goal", |g| g.id.clone()))
            .await
    }
}

fn row_id(row: &RawTransactionRow) -> String {
    row.id.as_ref().map(|c| c.text()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::TransactionType;
    use tempfile::TempDir;

    const SHEET: &str = r#"
transactions:
  - ID: txn_1
    Account: Retirement
    AssetType: Equity
    TranType: SIP
    Realised: "FALSE"
    Security: " Index Fund "
    Quantity: 10
    BuyDate: "2023-01-01"
    " BuyRate ": "₹1,000"
    CurrentRate: 1100
  - ID: txn_2
    Account: Investment
    AssetType: Equity
    TranType: Dividend
    Realised: "TRUE"
    Security: Index Fund
    Gain/Loss: "250"
goals:
  - id: goal_1
    name: Retirement
    targetAmount: 100000
    targetDate: "2040-01-01"
"#;

    #[tokio::test]
    async fn test_reads_sheet_shaped_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.yaml");
        std::fs::write(&path, SHEET)?;
        let source = YamlFileSource::new(&path);

        let txns = source.fetch_transactions().await?;
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].security, "Index Fund");
        assert_eq!(txns[0].kind, TransactionType::Sip);
        assert_eq!(txns[0].invested, 10000.0);
        assert_eq!(txns[0].current_value, 11000.0);
        assert!(txns[1].realized);
        assert_eq!(txns[1].gain_loss, 250.0);

        let goals = source.fetch_goals().await?;
        assert_eq!(goals[0].category, "other");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_and_created_on_write() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("data.yaml");
        let source = YamlFileSource::new(&path);
        assert!(source.fetch_transactions().await?.is_empty());

        let txn = TransactionRecord {
            id: "txn_9".to_string(),
            security: "Gold ETF".to_string(),
            asset_class: "Gold".to_string(),
            units: 2.0,
            buy_rate: 50.0,
            invested: 100.0,
            current_value: 120.0,
            buy_date: "2024-02-01".to_string(),
            ..Default::default()
        };
        source.write_transaction(&txn).await?;
        assert!(path.exists());

        let read_back = source.fetch_transactions().await?;
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].id, "txn_9");
        assert_eq!(read_back[0].invested, 100.0);
        assert_eq!(read_back[0].current_value, 120.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.yaml");
        std::fs::write(&path, SHEET)?;
        let source = YamlFileSource::new(&path);

        let mut txn = source.fetch_transactions().await?.remove(0);
        txn.current_value = 15000.0;
        source.update_transaction("txn_1", &txn).await?;
        assert_eq!(source.fetch_transactions().await?[0].current_value, 15000.0);

        source.delete_transaction("txn_2").await?;
        assert_eq!(source.fetch_transactions().await?.len(), 1);

        let err = source.delete_goal("goal_404").await.unwrap_err();
        assert_eq!(err.to_string(), "Goal not found: goal_404");
        Ok(())
    }

    #[tokio::test]
    async fn test_rows_with_bad_quantity_are_dropped() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.yaml");
        std::fs::write(
            &path,
            r#"
transactions:
  - ID: good
    TranType: Buy
    Quantity: 5
    BuyRate: 10
  - ID: bad
    TranType: Buy
    Quantity: "five"
    BuyRate: 10
"#,
        )?;
        let txns = YamlFileSource::new(&path).fetch_transactions().await?;
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].id, "good");
        assert_eq!(txns[0].invested, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.yaml");
        std::fs::write(&path, "transactions: [unterminated")?;
        let source = YamlFileSource::new(&path);
        assert!(source.fetch_transactions().await.is_err());
        Ok(())
    }
}
