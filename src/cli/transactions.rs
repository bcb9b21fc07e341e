use super::ui;
use crate::core::transaction::TransactionRecord;
use crate::service::PortfolioService;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_transactions(transactions: &[TransactionRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Date"),
        ui::header_cell("Security"),
        ui::header_cell("Asset Class"),
        ui::header_cell("Account"),
        ui::header_cell("Type"),
        ui::header_cell("Units"),
        ui::header_cell("Invested"),
        ui::header_cell("Value"),
        ui::header_cell("Gain/Loss"),
    ]);
    for txn in transactions {
        // Closed positions show what they sold for; open ones their current value.
        let value = if txn.realized {
            txn.sell_value
        } else {
            txn.current_value
        };
        table.add_row(vec![
            Cell::new(&txn.id),
            Cell::new(&txn.buy_date),
            Cell::new(&txn.security),
            Cell::new(&txn.asset_class),
            Cell::new(&txn.account),
            Cell::new(txn.kind.as_str()),
            ui::amount_cell(txn.units),
            ui::amount_cell(txn.invested),
            ui::amount_cell(value),
            ui::format_optional_cell(txn.realized.then_some(txn.gain_loss), |g| {
                format!("{g:.2}")
            }),
        ]);
    }
    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text("Transactions", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("{} transactions", transactions.len()),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(service: &PortfolioService) -> Result<()> {
    let pb = ui::new_spinner("Loading transactions...");
    let transactions = service.transactions().await;
    pb.finish_and_clear();

    println!("{}", display_transactions(&transactions));
    Ok(())
}
