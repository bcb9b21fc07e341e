//! The facade an API layer or the CLI talks to. Reads go through the TTL
//! cache; writes go to the data source and then invalidate the dataset.
use crate::core::cache::{Cache, CacheStats};
use crate::core::clock::Clock;
use crate::core::config::CacheConfig;
use crate::core::goals::{self, Goal, GoalDraft};
use crate::core::holdings::{GroupBy, Holding, HoldingsFilter, HoldingsView, aggregate_holdings};
use crate::core::source::DataSource;
use crate::core::summary::{PortfolioSummary, summarize_portfolio};
use crate::core::transaction::{TransactionDraft, TransactionRecord};
use crate::store::memory::MemoryCache;
use anyhow::{Context, Result};
use futures::join;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, info, warn};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const GOALS_KEY: &str = "goals";

/// Last millisecond stamp handed out as a record id, process-wide.
static LAST_ID_STAMP: AtomicI64 = AtomicI64::new(0);

/// Millisecond stamp for a new record id. Strictly increasing, so records
/// created within the same millisecond still get distinct ids.
fn next_id_stamp(now_millis: i64) -> i64 {
    let previous = LAST_ID_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_millis.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now_millis.max(previous + 1)
}

pub struct PortfolioService {
    source: Arc<dyn DataSource>,
    transactions: MemoryCache<Vec<TransactionRecord>>,
    goals: MemoryCache<Vec<Goal>>,
    clock: Arc<dyn Clock>,
}

impl PortfolioService {
    pub async fn new(
        source: Arc<dyn DataSource>,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let transactions: MemoryCache<Vec<TransactionRecord>> =
            MemoryCache::with_limits(cache.ttl(), cache.max_entry_bytes(), Arc::clone(&clock));
        transactions.register(&[TRANSACTIONS_KEY]).await;
        let goals: MemoryCache<Vec<Goal>> =
            MemoryCache::with_limits(cache.ttl(), cache.max_entry_bytes(), Arc::clone(&clock));
        goals.register(&[GOALS_KEY]).await;
        debug!("Portfolio service ready on {}", source.describe());
        Self {
            source,
            transactions,
            goals,
            clock,
        }
    }

    /// Cached transaction list. A failing source reads as empty and the
    /// failure is not cached.
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        if let Some(txns) = self.transactions.get(TRANSACTIONS_KEY).await {
            return txns;
        }
        match self.source.fetch_transactions().await {
            Ok(txns) => {
                info!("Fetched {} transactions from {}", txns.len(), self.source.describe());
                self.transactions.set(TRANSACTIONS_KEY, txns.clone()).await;
                txns
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch transactions, using an empty dataset");
                Vec::new()
            }
        }
    }

    /// Cached goal list, without progress figures.
    pub async fn goals(&self) -> Vec<Goal> {
        if let Some(goals) = self.goals.get(GOALS_KEY).await {
            return goals;
        }
        match self.source.fetch_goals().await {
            Ok(goals) => {
                info!("Fetched {} goals from {}", goals.len(), self.source.describe());
                self.goals.set(GOALS_KEY, goals.clone()).await;
                goals
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch goals, using an empty dataset");
                Vec::new()
            }
        }
    }

    pub async fn portfolio_summary(&self) -> PortfolioSummary {
        let txns = self.transactions().await;
        summarize_portfolio(&txns, self.clock.today())
    }

    pub async fn holdings(
        &self,
        filter: &HoldingsFilter,
        view: HoldingsView,
        group_by: GroupBy,
    ) -> Vec<Holding> {
        let txns = self.transactions().await;
        aggregate_holdings(&txns, view, group_by, filter, self.clock.today())
    }

    pub async fn goals_with_progress(&self) -> Vec<Goal> {
        let (goal_list, txns) = join!(self.goals(), self.transactions());
        goals::goals_with_progress(goal_list, &txns, self.clock.today())
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let (transactions, goals) = join!(self.transactions.stats(), self.goals.stats());
        transactions.merge(goals)
    }

    pub async fn create_transaction(&self, draft: TransactionDraft) -> Result<TransactionRecord> {
        let id = format!("txn_{}", next_id_stamp(self.clock.now().timestamp_millis()));
        let record = draft.into_record(id)?;
        let written = self.source.write_transaction(&record).await;
        self.transactions.invalidate(TRANSACTIONS_KEY).await;
        written.with_context(|| format!("Failed to add transaction {}", record.id))?;
        info!("Added transaction {}", record.id);
        Ok(record)
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        mut record: TransactionRecord,
    ) -> Result<TransactionRecord> {
        record.id = id.to_string();
        let written = self.source.update_transaction(id, &record).await;
        self.transactions.invalidate(TRANSACTIONS_KEY).await;
        written.with_context(|| format!("Failed to update transaction {id}"))?;
        Ok(record)
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let deleted = self.source.delete_transaction(id).await;
        self.transactions.invalidate(TRANSACTIONS_KEY).await;
        deleted.with_context(|| format!("Failed to delete transaction {id}"))
    }

    pub async fn create_goal(&self, draft: GoalDraft) -> Result<Goal> {
        let id = format!("goal_{}", next_id_stamp(self.clock.now().timestamp_millis()));
        let goal = draft.into_goal(id)?;
        let written = self.source.write_goal(&goal).await;
        self.goals.invalidate(GOALS_KEY).await;
        written.with_context(|| format!("Failed to add goal {}", goal.id))?;
        info!("Added goal {}", goal.id);
        Ok(goal)
    }

    pub async fn update_goal(&self, id: &str, mut goal: Goal) -> Result<Goal> {
        goal.id = id.to_string();
        let written = self.source.update_goal(id, &goal).await;
        self.goals.invalidate(GOALS_KEY).await;
        written.with_context(|| format!("Failed to update goal {id}"))?;
        Ok(goal)
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        let deleted = self.source.delete_goal(id).await;
        self.goals.invalidate(GOALS_KEY).await;
        deleted.with_context(|| format!("Failed to delete goal {id}"))
    }
}
