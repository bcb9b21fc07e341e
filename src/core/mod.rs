//! Core business logic: records, analytics and the abstractions the service
//! is wired from.

pub mod cache;
pub mod cashflow;
pub mod clock;
pub mod config;
pub mod date;
pub mod goals;
pub mod holdings;
pub mod log;
pub mod source;
pub mod summary;
pub mod transaction;
pub mod xirr;

// Re-export main types for cleaner imports
pub use cache::{Cache, CacheStats, KeyStats};
pub use clock::{Clock, FixedClock, SystemClock};
pub use goals::{Goal, GoalDraft};
pub use holdings::{GroupBy, Holding, HoldingsFilter, HoldingsView};
pub use source::DataSource;
pub use summary::{AllocationEntry, PortfolioSummary};
pub use transaction::{TransactionDraft, TransactionRecord, TransactionType};
