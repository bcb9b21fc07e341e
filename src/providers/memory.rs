use super::util::{remove_by_id, replace_by_id};
use crate::core::goals::Goal;
use crate::core::source::DataSource;
use crate::core::transaction::TransactionRecord;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// A data source that lives in process memory. Used when no data file is
/// configured, and in tests.
#[derive(Default)]
pub struct MemorySource {
    transactions: RwLock<Vec<TransactionRecord>>,
    goals: RwLock<Vec<Goal>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(transactions: Vec<TransactionRecord>, goals: Vec<Goal>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
            goals: RwLock::new(goals),
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    async fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.transactions.read().await.clone())
    }

    async fn write_transaction(&self, txn: &TransactionRecord) -> Result<()> {
        debug!("Appending transaction {}", txn.id);
        self.transactions.write().await.push(txn.clone());
        Ok(())
    }

    async fn update_transaction(&self, id: &str, txn: &TransactionRecord) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        replace_by_id(&mut transactions, id, txn.clone(), "Transaction", |t| {
            t.id.clone()
        })
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        remove_by_id(&mut transactions, id, "Transaction", |t| t.id.clone())
    }

    async fn fetch_goals(&self) -> Result<Vec<Goal>> {
        Ok(self.goals.read().await.clone())
    }

    async fn write_goal(&self, goal: &Goal) -> Result<()> {
        debug!("Appending goal {}", goal.id);
        self.goals.write().await.push(goal.clone());
        Ok(())
    }

    async fn update_goal(&self, id: &str, goal: &Goal) -> Result<()> {
        let mut goals = self.goals.write().await;
        replace_by_id(&mut goals, id, goal.clone(), "Goal", |g| g.id.clone())
    }

    async fn delete_goal(&self, id: &str) -> Result<()> {
        let mut goals = self.goals.write().await;
        remove_by_id(&mut goals, id, "Goal", |g| g.id.clone())
    }
}
