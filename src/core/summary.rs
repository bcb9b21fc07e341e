//! Whole-portfolio rollup.
use crate::core::cashflow::build_cash_flows;
use crate::core::holdings::{
    GroupBy, HoldingsFilter, HoldingsView, aggregate_holdings, round2,
};
use crate::core::transaction::TransactionRecord;
use crate::core::xirr::xirr;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Share of the portfolio held in one asset class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub asset_class: String,
    pub value: f64,
    pub invested: f64,
    /// Share of total current value, in percent.
    pub percentage: f64,
    pub xirr: Option<f64>,
    pub realized_pl: f64,
    pub dividends: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_invested: f64,
    pub unrealized_pl: f64,
    pub realized_pl: f64,
    pub dividends: f64,
    /// XIRR of the open positions.
    pub xirr: Option<f64>,
    /// XIRR of the exited positions, dividends excluded.
    pub realized_xirr: Option<f64>,
    pub realized_invested: f64,
    pub allocation: Vec<AllocationEntry>,
}

/// Summarizes every transaction into portfolio totals, returns and an
/// asset-class allocation valued at `as_of`.
pub fn summarize_portfolio(transactions: &[TransactionRecord], as_of: NaiveDate) -> PortfolioSummary {
    let open: Vec<&TransactionRecord> = transactions
        .iter()
        .filter(|t| t.is_open_position())
        .collect();
    let closed: Vec<&TransactionRecord> = transactions
        .iter()
        .filter(|t| t.is_closed_position())
        .collect();

    let total_invested: f64 = open.iter().map(|t| t.invested).sum();
    let total_value: f64 = open.iter().map(|t| t.current_value).sum();
    let (dividends, realized_pl) = transactions
        .iter()
        .filter(|t| t.realized)
        .fold((0.0, 0.0), |(div, pl), t| {
            if t.is_dividend() {
                (div + t.gain_loss, pl)
            } else {
                (div, pl + t.gain_loss)
            }
        });
    let realized_invested: f64 = closed.iter().map(|t| t.realized_invested()).sum();

    let no_filter = HoldingsFilter::default();
    let realized_by_class: HashMap<String, (f64, f64)> = aggregate_holdings(
        transactions,
        HoldingsView::Realized,
        GroupBy::AssetClass,
        &no_filter,
        as_of,
    )
    .into_iter()
    .map(|h| (h.name, (h.realized_pl, h.dividends)))
    .collect();

    let allocation = aggregate_holdings(
        transactions,
        HoldingsView::Unrealized,
        GroupBy::AssetClass,
        &no_filter,
        as_of,
    )
    .into_iter()
    .filter(|h| h.current_value > 0.0)
    .map(|h| {
        let (realized_pl, dividends) = realized_by_class
            .get(&h.name)
            .copied()
            .unwrap_or_default();
        AllocationEntry {
            percentage: if total_value > 0.0 {
                round2(h.current_value / total_value * 100.0)
            } else {
                0.0
            },
            asset_class: h.name,
            value: h.current_value,
            invested: h.invested,
            xirr: h.xirr,
            realized_pl,
            dividends,
        }
    })
    .collect();

    PortfolioSummary {
        total_value: round2(total_value),
        total_invested: round2(total_invested),
        unrealized_pl: round2(total_value - total_invested),
        realized_pl: round2(realized_pl),
        dividends: round2(dividends),
        xirr: xirr(&build_cash_flows(&open, as_of)),
        realized_xirr: xirr(&build_cash_flows(&closed, as_of)),
        realized_invested: round2(realized_invested),
        allocation,
    }
}
