//! Terminal rendering for each command.

pub mod cache;
pub mod goals;
pub mod holdings;
pub mod setup;
pub mod summary;
pub mod transactions;
pub mod ui;
