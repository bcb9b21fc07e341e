use super::ui;
use crate::core::summary::PortfolioSummary;
use crate::service::PortfolioService;
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

impl PortfolioSummary {
    pub fn display_as_table(&self) -> String {
        let mut totals = ui::new_styled_table();
        totals.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
        totals.add_row(vec![Cell::new("Invested"), ui::amount_cell(self.total_invested)]);
        totals.add_row(vec![Cell::new("Current Value"), ui::amount_cell(self.total_value)]);
        totals.add_row(vec![Cell::new("Unrealized P&L"), ui::pl_cell(self.unrealized_pl)]);
        totals.add_row(vec![Cell::new("XIRR"), ui::xirr_cell(self.xirr)]);
        totals.add_row(vec![Cell::new("Realized P&L"), ui::pl_cell(self.realized_pl)]);
        totals.add_row(vec![Cell::new("Dividends"), ui::amount_cell(self.dividends)]);
        totals.add_row(vec![
            Cell::new("Realized Invested"),
            ui::amount_cell(self.realized_invested),
        ]);
        totals.add_row(vec![Cell::new("Realized XIRR"), ui::xirr_cell(self.realized_xirr)]);

        let mut output = format!(
            "{}\n\n{}",
            ui::style_text("Portfolio Summary", ui::StyleType::Title),
            totals
        );

        if self.allocation.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("No open positions.", ui::StyleType::Subtle)
            ));
            return output;
        }

        let mut allocation = ui::new_styled_table();
        allocation.set_header(vec![
            ui::header_cell("Asset Class"),
            ui::header_cell("Invested"),
            ui::header_cell("Value"),
            ui::header_cell("Weight (%)"),
            ui::header_cell("XIRR"),
            ui::header_cell("Realized P&L"),
            ui::header_cell("Dividends"),
        ]);
        for entry in &self.allocation {
            allocation.add_row(vec![
                Cell::new(&entry.asset_class),
                ui::amount_cell(entry.invested),
                ui::amount_cell(entry.value),
                ui::amount_cell(entry.percentage),
                ui::xirr_cell(entry.xirr),
                ui::pl_cell(entry.realized_pl),
                ui::amount_cell(entry.dividends),
            ]);
        }

        output.push_str(&format!(
            "\n\n{}\n\n{}",
            ui::style_text("Allocation", ui::StyleType::Title),
            allocation
        ));
        output
    }
}

pub async fn run(service: &PortfolioService) -> Result<()> {
    let pb = ui::new_spinner("Loading transactions...");
    let summary = service.portfolio_summary().await;
    pb.finish_and_clear();
    info!(
        xirr = %ui::format_xirr(summary.xirr),
        realized_xirr = %ui::format_xirr(summary.realized_xirr),
        "Computed portfolio summary"
    );

    println!("{}", summary.display_as_table());
    Ok(())
}
