//! Transaction records and their normalization from spreadsheet-shaped rows.
use crate::core::date::parse_date;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Transaction type as recorded in the source. Matching is exact and
/// case-sensitive; anything unrecognised is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    #[default]
    Invest,
    Trade,
    Buy,
    Sip,
    SipInstallment,
    Purchase,
    Dividend,
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Invest => "Invest",
            TransactionType::Trade => "Trade",
            TransactionType::Buy => "Buy",
            TransactionType::Sip => "SIP",
            TransactionType::SipInstallment => "SIP Installment",
            TransactionType::Purchase => "Purchase",
            TransactionType::Dividend => "Dividend",
            TransactionType::Other(s) => s,
        }
    }

    /// Types that count towards held positions.
    pub fn is_investment(&self) -> bool {
        matches!(
            self,
            TransactionType::Invest
                | TransactionType::Trade
                | TransactionType::Buy
                | TransactionType::Sip
                | TransactionType::SipInstallment
                | TransactionType::Purchase
        )
    }
}

impl From<&str> for TransactionType {
    fn from(s: &str) -> Self {
        match s {
            "Invest" => TransactionType::Invest,
            "Trade" => TransactionType::Trade,
            "Buy" => TransactionType::Buy,
            "SIP" => TransactionType::Sip,
            "SIP Installment" => TransactionType::SipInstallment,
            "Purchase" => TransactionType::Purchase,
            "Dividend" => TransactionType::Dividend,
            other => TransactionType::Other(other.to_string()),
        }
    }
}

impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        TransactionType::from(s.as_str())
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional date/value pair that takes precedence over the standard columns
/// when computing returns. A value of exactly zero counts as "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XirrOverride {
    pub date: Option<String>,
    pub value: f64,
}

impl XirrOverride {
    /// The override date text, if one was actually filled in.
    pub fn date_text(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.trim().is_empty())
    }

    pub fn has_value(&self) -> bool {
        self.value != 0.0
    }
}

/// A single normalized transaction. Dates stay as text and are parsed where
/// they are needed, so one bad cell only drops the computation that uses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub security: String,
    pub asset_class: String,
    /// Account name; goals are matched against it.
    pub account: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub units: f64,
    pub buy_rate: f64,
    pub sell_rate: f64,
    pub current_rate: f64,
    pub buy_date: String,
    pub sell_date: String,
    /// Amount invested (the sheet's buy value), usually positive.
    pub invested: f64,
    pub sell_value: f64,
    pub current_value: f64,
    pub xirr_buy: XirrOverride,
    pub xirr_sell: XirrOverride,
    pub realized: bool,
    pub gain_loss: f64,
    pub entity: String,
}

impl TransactionRecord {
    pub fn is_dividend(&self) -> bool {
        self.kind == TransactionType::Dividend
    }

    /// Unrealized and of an investment type.
    pub fn is_open_position(&self) -> bool {
        !self.realized && self.kind.is_investment()
    }

    /// Realized and of an investment type, i.e. an exited position.
    pub fn is_closed_position(&self) -> bool {
        self.realized && self.kind.is_investment()
    }

    /// Date of the investment outflow. The override column wins whenever it
    /// has text, even if that text does not parse.
    pub fn entry_date(&self) -> Option<NaiveDate> {
        parse_date(self.xirr_buy.date_text().unwrap_or(&self.buy_date))
    }

    /// Signed investment outflow.
    pub fn entry_amount(&self) -> f64 {
        if self.xirr_buy.date_text().is_some() && self.xirr_buy.has_value() {
            self.xirr_buy.value
        } else if self.invested > 0.0 {
            -self.invested
        } else {
            self.invested
        }
    }

    pub fn exit_date(&self) -> Option<NaiveDate> {
        parse_date(self.xirr_sell.date_text().unwrap_or(&self.sell_date))
    }

    pub fn exit_value(&self) -> f64 {
        if self.xirr_sell.has_value() {
            self.xirr_sell.value
        } else {
            self.sell_value
        }
    }

    /// Value of a still-held position for return calculations.
    pub fn terminal_value(&self) -> f64 {
        if self.xirr_sell.has_value() {
            self.xirr_sell.value
        } else {
            self.current_value
        }
    }

    /// Capital that went into an exited position.
    pub fn realized_invested(&self) -> f64 {
        if self.xirr_buy.has_value() && self.xirr_buy.date_text().is_some() {
            self.xirr_buy.value.abs()
        } else {
            self.invested.abs()
        }
    }
}

/// A spreadsheet cell as it arrives from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(&self) -> String {
        match self {
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_amount(s),
            Cell::Bool(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Parses a currency cell such as `"₹1,23,456.50"` or `"-2,000"`.
/// Blank cells, a lone `-` and anything non-numeric yield `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '₹' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// One row of the transactions sheet. Header spellings vary between sheet
/// revisions, hence the aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTransactionRow {
    #[serde(rename = "ID")]
    pub id: Option<Cell>,
    #[serde(rename = "Account")]
    pub account: Option<Cell>,
    #[serde(rename = "AssetType")]
    pub asset_type: Option<Cell>,
    #[serde(rename = "TranType")]
    pub tran_type: Option<Cell>,
    #[serde(rename = "Realised")]
    pub realised: Option<Cell>,
    #[serde(rename = "Security", alias = " Security ")]
    pub security: Option<Cell>,
    #[serde(rename = "Quantity")]
    pub quantity: Option<Cell>,
    #[serde(rename = "BuyDate")]
    pub buy_date: Option<Cell>,
    #[serde(rename = "SellDate")]
    pub sell_date: Option<Cell>,
    #[serde(rename = "BuyRate", alias = " BuyRate ")]
    pub buy_rate: Option<Cell>,
    #[serde(rename = "SellRate", alias = " SellRate ")]
    pub sell_rate: Option<Cell>,
    #[serde(rename = "CurrentRate", alias = " CurrentRate ")]
    pub current_rate: Option<Cell>,
    #[serde(rename = "Gain/Loss", alias = " Gain/Loss ", alias = " Gain\n/Loss ")]
    pub gain_loss: Option<Cell>,
    #[serde(rename = "BuyValue", alias = " BuyValue ")]
    pub buy_value: Option<Cell>,
    #[serde(rename = "SellValue", alias = " SellValue ")]
    pub sell_value: Option<Cell>,
    #[serde(rename = "CurrentValue", alias = " CurrentValue ")]
    pub current_value: Option<Cell>,
    #[serde(rename = "XIRR Buy date", alias = "XIRR \nBuy date")]
    pub xirr_buy_date: Option<Cell>,
    #[serde(rename = "XIRR Sell date", alias = "XIRR \nSell date")]
    pub xirr_sell_date: Option<Cell>,
    #[serde(
        rename = "XIRR Buy Value",
        alias = " XIRR Buy Value ",
        alias = " XIRR \nBuy Value "
    )]
    pub xirr_buy_value: Option<Cell>,
    #[serde(
        rename = "XIRR Sell Value",
        alias = " XIRR Sell Value ",
        alias = " XIRR \nSell Value "
    )]
    pub xirr_sell_value: Option<Cell>,
    #[serde(rename = "Entity", alias = " Entity ")]
    pub entity: Option<Cell>,
}

impl RawTransactionRow {
    /// A blank quantity reads as zero units; anything else must be a number.
    pub fn has_usable_quantity(&self) -> bool {
        match &self.quantity {
            None | Some(Cell::Number(_)) => true,
            Some(Cell::Bool(_)) => false,
            Some(Cell::Text(text)) => text.trim().is_empty() || parse_amount(text).is_some(),
        }
    }
}

fn cell_text(cell: &Option<Cell>) -> String {
    cell.as_ref().map(Cell::text).unwrap_or_default()
}

fn cell_amount(cell: &Option<Cell>) -> f64 {
    cell.as_ref().and_then(Cell::amount).unwrap_or(0.0)
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

impl From<&RawTransactionRow> for TransactionRecord {
    fn from(row: &RawTransactionRow) -> Self {
        let units = cell_amount(&row.quantity);
        let buy_rate = cell_amount(&row.buy_rate);
        let sell_rate = cell_amount(&row.sell_rate);
        // Broken formulas show up as #REF!; fall back to the buy rate.
        let current_rate = row
            .current_rate
            .as_ref()
            .and_then(|c| parse_amount(&c.text().replace("#REF!", "")))
            .unwrap_or(buy_rate);

        let mut invested = cell_amount(&row.buy_value);
        if invested == 0.0 && units > 0.0 {
            invested = units * buy_rate;
        }
        let mut current_value = cell_amount(&row.current_value);
        if current_value == 0.0 && units > 0.0 {
            current_value = units * current_rate;
        }

        TransactionRecord {
            id: cell_text(&row.id),
            security: cell_text(&row.security).trim().to_string(),
            asset_class: cell_text(&row.asset_type),
            account: cell_text(&row.account),
            kind: TransactionType::from(cell_text(&row.tran_type)),
            units,
            buy_rate: if buy_rate > 0.0 { buy_rate } else { sell_rate },
            sell_rate,
            current_rate,
            buy_date: cell_text(&row.buy_date),
            sell_date: cell_text(&row.sell_date),
            invested,
            sell_value: cell_amount(&row.sell_value),
            current_value,
            xirr_buy: XirrOverride {
                date: non_empty(cell_text(&row.xirr_buy_date)),
                value: cell_amount(&row.xirr_buy_value),
            },
            xirr_sell: XirrOverride {
                date: non_empty(cell_text(&row.xirr_sell_date)),
                value: cell_amount(&row.xirr_sell_value),
            },
            realized: cell_text(&row.realised).trim().eq_ignore_ascii_case("TRUE"),
            gain_loss: cell_amount(&row.gain_loss),
            entity: cell_text(&row.entity).trim().to_string(),
        }
    }
}

impl From<&TransactionRecord> for RawTransactionRow {
    fn from(txn: &TransactionRecord) -> Self {
        let text = |s: &str| (!s.is_empty()).then(|| Cell::from(s));
        let amount = |n: f64| (n != 0.0).then_some(Cell::Number(n));
        RawTransactionRow {
            id: Some(Cell::from(txn.id.as_str())),
            account: text(&txn.account),
            asset_type: text(&txn.asset_class),
            tran_type: Some(Cell::from(txn.kind.as_str())),
            realised: Some(Cell::from(if txn.realized { "TRUE" } else { "FALSE" })),
            security: text(&txn.security),
            quantity: Some(Cell::Number(txn.units)),
            buy_date: text(&txn.buy_date),
            sell_date: text(&txn.sell_date),
            buy_rate: amount(txn.buy_rate),
            sell_rate: amount(txn.sell_rate),
            current_rate: amount(txn.current_rate),
            gain_loss: amount(txn.gain_loss),
            buy_value: amount(txn.invested),
            sell_value: amount(txn.sell_value),
            current_value: amount(txn.current_value),
            xirr_buy_date: txn.xirr_buy.date.as_deref().and_then(text),
            xirr_sell_date: txn.xirr_sell.date.as_deref().and_then(text),
            xirr_buy_value: amount(txn.xirr_buy.value),
            xirr_sell_value: amount(txn.xirr_sell.value),
            entity: text(&txn.entity),
        }
    }
}

/// A new transaction as submitted by a user. Only presence of the required
/// fields is checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionDraft {
    pub date: Option<String>,
    pub asset_class: Option<String>,
    pub security: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub units: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub current_price: Option<f64>,
    pub account: Option<String>,
    pub entity: Option<String>,
}

impl TransactionDraft {
    pub fn into_record(self, id: String) -> Result<TransactionRecord> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.asset_class.is_none() {
            missing.push("assetClass");
        }
        if self.security.is_none() {
            missing.push("security");
        }
        if self.kind.is_none() {
            missing.push("type");
        }
        if self.units.is_none() {
            missing.push("units");
        }
        if self.price_per_unit.is_none() {
            missing.push("pricePerUnit");
        }
        let (
            Some(date),
            Some(asset_class),
            Some(security),
            Some(kind),
            Some(units),
            Some(price),
        ) = (
            self.date,
            self.asset_class,
            self.security,
            self.kind,
            self.units,
            self.price_per_unit,
        )
        else {
            bail!("Missing required fields: {}", missing.join(", "));
        };

        let current_rate = self.current_price.unwrap_or(price);
        let invested = units * price;
        let current_value = units * current_rate;
        Ok(TransactionRecord {
            id,
            security,
            asset_class,
            account: self.account.unwrap_or_else(|| "Investment".to_string()),
            kind: TransactionType::from(kind),
            units,
            buy_rate: price,
            current_rate,
            buy_date: date,
            invested,
            current_value,
            gain_loss: current_value - invested,
            entity: self.entity.unwrap_or_default(),
            ..Default::default()
        })
    }
}
