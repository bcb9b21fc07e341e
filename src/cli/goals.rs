use super::ui;
use crate::core::goals::Goal;
use crate::service::PortfolioService;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_goals(goals: &[Goal]) -> String {
    let title = ui::style_text("Goals", ui::StyleType::Title);
    if goals.is_empty() {
        return format!(
            "{title}\n\n{}",
            ui::style_text("No goals defined.", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell("Category"),
        ui::header_cell("Target"),
        ui::header_cell("Target Date"),
        ui::header_cell("Current"),
        ui::header_cell("Progress (%)"),
        ui::header_cell("XIRR"),
    ]);
    for goal in goals {
        table.add_row(vec![
            Cell::new(&goal.name),
            Cell::new(&goal.category),
            ui::amount_cell(goal.target_amount),
            Cell::new(&goal.target_date),
            ui::amount_cell(goal.current_value),
            ui::format_percentage_cell(goal.progress),
            ui::xirr_cell(goal.xirr),
        ]);
    }
    format!("{title}\n\n{table}")
}

pub async fn run(service: &PortfolioService) -> Result<()> {
    let pb = ui::new_spinner("Loading goals...");
    let goals = service.goals_with_progress().await;
    pb.finish_and_clear();

    println!("{}", display_goals(&goals));
    Ok(())
}
