//! Savings goals and their progress, tracked through the account they are
//! named after.
use crate::core::cashflow::build_cash_flows;
use crate::core::holdings::round2;
use crate::core::transaction::TransactionRecord;
use crate::core::xirr::xirr;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    /// Matched against transaction accounts.
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub target_date: String,
    #[serde(default, rename = "value")]
    pub current_value: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xirr: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalDraft {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub target_date: Option<String>,
    pub category: Option<String>,
}

impl GoalDraft {
    pub fn into_goal(self, id: String) -> Result<Goal> {
        let (Some(name), Some(target_amount), Some(target_date)) =
            (self.name, self.target_amount, self.target_date)
        else {
            bail!("Missing required fields: name, targetAmount and targetDate are required");
        };
        Ok(Goal {
            id,
            name,
            category: self.category.unwrap_or_else(default_category),
            target_amount,
            target_date,
            current_value: 0.0,
            progress: 0.0,
            xirr: None,
        })
    }
}

/// Percentage of `target` reached, capped at 100. Zero for non-positive
/// targets.
pub fn progress(current_value: f64, target: f64) -> f64 {
    if target > 0.0 {
        (current_value / target * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Fills in current value, XIRR and progress for each goal from the
/// unrealized transactions of the account with the goal's name. Every
/// unrealized row counts here, whatever its type.
pub fn goals_with_progress(
    goals: Vec<Goal>,
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
) -> Vec<Goal> {
    let mut accounts: HashMap<&str, Vec<&TransactionRecord>> = HashMap::new();
    for txn in transactions.iter().filter(|t| !t.realized) {
        accounts.entry(txn.account.as_str()).or_default().push(txn);
    }

    goals
        .into_iter()
        .map(|mut goal| {
            let (value, rate) = accounts
                .get(goal.name.as_str())
                .map_or((0.0, None), |members| {
                    let value: f64 = members.iter().map(|t| t.current_value).sum();
                    (round2(value), xirr(&build_cash_flows(members, as_of)))
                });
            goal.current_value = value;
            goal.xirr = rate;
            goal.progress = round2(progress(value, goal.target_amount));
            goal
        })
        .collect()
}
