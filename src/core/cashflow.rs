//! Turns transaction records into dated, signed cash flows.
use crate::core::date::parse_date;
use crate::core::transaction::TransactionRecord;
use chrono::NaiveDate;
use tracing::debug;

/// A dated cash movement; negative is money going in, positive coming out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Builds the cash-flow series for a set of transactions.
///
/// Every transaction contributes its investment outflow. Realized ones add
/// their sale proceeds at the exit date; unrealized ones are summed into a
/// single terminal inflow dated at the latest valuation override, or at
/// `as_of` when none is recorded. Transactions with unusable dates are
/// skipped.
pub fn build_cash_flows(transactions: &[&TransactionRecord], as_of: NaiveDate) -> Vec<CashFlow> {
    let mut flows = Vec::with_capacity(transactions.len() + 1);
    let mut terminal_value = 0.0;
    let mut valuation_date: Option<NaiveDate> = None;

    for txn in transactions {
        let Some(entry_date) = txn.entry_date() else {
            debug!("Skipping {} for cash flows: unparseable entry date", txn.id);
            continue;
        };
        let entry = CashFlow::new(entry_date, txn.entry_amount());

        if txn.realized {
            let Some(exit_date) = txn.exit_date() else {
                debug!("Skipping realized {}: unparseable exit date", txn.id);
                continue;
            };
            if entry.amount != 0.0 {
                flows.push(entry);
            }
            let proceeds = txn.exit_value().abs();
            if proceeds != 0.0 {
                flows.push(CashFlow::new(exit_date, proceeds));
            }
        } else {
            if entry.amount != 0.0 {
                flows.push(entry);
            }
            terminal_value += txn.terminal_value();
            if let Some(date) = txn.xirr_sell.date_text().and_then(parse_date) {
                valuation_date = Some(valuation_date.map_or(date, |d| d.max(date)));
            }
        }
    }

    if terminal_value > 0.0 {
        flows.push(CashFlow::new(
            valuation_date.unwrap_or(as_of),
            terminal_value,
        ));
    }

    flows
}
