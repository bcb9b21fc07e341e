//! The external store that holds transactions and goals.

use crate::core::goals::Goal;
use crate::core::transaction::TransactionRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Read/write access to the transaction and goal datasets.
///
/// Implementations do their own I/O. Errors from the fetch methods mean the
/// source is unavailable; callers degrade to an empty dataset.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short description for logs, e.g. the backing file path.
    fn describe(&self) -> String;

    async fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>>;
    async fn write_transaction(&self, txn: &TransactionRecord) -> Result<()>;
    async fn update_transaction(&self, id: &str, txn: &TransactionRecord) -> Result<()>;
    async fn delete_transaction(&self, id: &str) -> Result<()>;

    async fn fetch_goals(&self) -> Result<Vec<Goal>>;
    async fn write_goal(&self, goal: &Goal) -> Result<()>;
    async fn update_goal(&self, id: &str, goal: &Goal) -> Result<()>;
    async fn delete_goal(&self, id: &str) -> Result<()>;
}
