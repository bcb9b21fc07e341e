use super::ui;
use crate::core::holdings::{GroupBy, Holding, HoldingsFilter, HoldingsView};
use crate::service::PortfolioService;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_holdings(holdings: &[Holding], view: HoldingsView, group_by: GroupBy) -> String {
    let mut table = ui::new_styled_table();
    let title = match view {
        HoldingsView::Unrealized => {
            table.set_header(vec![
                ui::header_cell(&group_by.to_string()),
                ui::header_cell("Asset Class"),
                ui::header_cell("Units"),
                ui::header_cell("Invested"),
                ui::header_cell("Value"),
                ui::header_cell("P&L"),
                ui::header_cell("P&L (%)"),
                ui::header_cell("XIRR"),
            ]);
            for h in holdings {
                table.add_row(vec![
                    Cell::new(&h.name),
                    Cell::new(&h.asset_class),
                    ui::amount_cell(h.units),
                    ui::amount_cell(h.invested),
                    ui::amount_cell(h.current_value),
                    ui::pl_cell(h.unrealized_pl),
                    ui::change_cell(h.unrealized_pl_percent),
                    ui::xirr_cell(h.xirr),
                ]);
            }
            "Holdings"
        }
        HoldingsView::Realized => {
            table.set_header(vec![
                ui::header_cell(&group_by.to_string()),
                ui::header_cell("Asset Class"),
                ui::header_cell("Units"),
                ui::header_cell("Realized P&L"),
                ui::header_cell("Dividends"),
            ]);
            for h in holdings {
                table.add_row(vec![
                    Cell::new(&h.name),
                    Cell::new(&h.asset_class),
                    ui::amount_cell(h.units),
                    ui::pl_cell(h.realized_pl),
                    ui::amount_cell(h.dividends),
                ]);
            }
            "Realized Holdings"
        }
    };

    if holdings.is_empty() {
        return format!(
            "{}\n\n{}",
            ui::style_text(title, ui::StyleType::Title),
            ui::style_text("Nothing to show.", ui::StyleType::Subtle)
        );
    }

    let total: f64 = match view {
        HoldingsView::Unrealized => holdings.iter().map(|h| h.current_value).sum(),
        HoldingsView::Realized => holdings.iter().map(|h| h.realized_pl + h.dividends).sum(),
    };
    format!(
        "{}\n\n{}\n\n{}: {}",
        ui::style_text(title, ui::StyleType::Title),
        table,
        ui::style_text("Total", ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalValue)
    )
}

pub async fn run(
    service: &PortfolioService,
    filter: &HoldingsFilter,
    view: HoldingsView,
    group_by: GroupBy,
) -> Result<()> {
    let pb = ui::new_spinner("Loading transactions...");
    let holdings = service.holdings(filter, view, group_by).await;
    pb.finish_and_clear();

    println!("{}", display_holdings(&holdings, view, group_by));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(name: &str, realized_pl: f64, dividends: f64) -> Holding {
        Holding {
            name: name.to_string(),
            asset_class: "Equity".to_string(),
            units: 10.0,
            invested: 0.0,
            current_value: 0.0,
            unrealized_pl: 0.0,
            unrealized_pl_percent: 0.0,
            realized_pl,
            dividends,
            xirr: None,
        }
    }

    #[test]
    fn test_realized_view_totals_gains_and_dividends() {
        let output = display_holdings(
            &[holding("Index Fund", 10000.0, 0.0), holding("Bank Stock", 0.0, 250.0)],
            HoldingsView::Realized,
            GroupBy::Security,
        );
        assert!(output.contains("Realized Holdings"));
        assert!(output.contains("Security"));
        assert!(output.contains("10250.00"));
    }

    #[test]
    fn test_empty_holdings() {
        let output = display_holdings(&[], HoldingsView::Unrealized, GroupBy::Account);
        assert!(output.contains("Nothing to show."));
    }
}
