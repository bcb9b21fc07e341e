use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Right-aligned amount with two decimals.
pub fn amount_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

/// Amount colored by sign: green for gains, red for losses.
pub fn pl_cell(value: f64) -> Cell {
    let color = if value >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(format!("{value:.2}"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Formats a percentage with bold green text
pub fn format_percentage_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}%"))
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
        .set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: f64) -> Cell {
    let text = format!("{change:.2}%");
    if change >= 0.0 {
        Cell::new(text)
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text)
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right)
    }
}

/// XIRR cell; a return that could not be computed shows as "N/A".
pub fn xirr_cell(xirr: Option<f64>) -> Cell {
    xirr.map_or_else(
        || {
            Cell::new("N/A")
                .fg(Color::DarkGrey)
                .set_alignment(CellAlignment::Right)
        },
        change_cell,
    )
}

/// Text form of an optional XIRR for summary lines.
pub fn format_xirr(xirr: Option<f64>) -> String {
    xirr.map_or("N/A".to_string(), |x| format!("{x:.2}%"))
}

/// Creates a spinner shown while data is loaded from the source.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
