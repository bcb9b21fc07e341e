use super::ui;
use crate::core::cache::CacheStats;
use crate::service::PortfolioService;
use anyhow::Result;
use comfy_table::Cell;

impl CacheStats {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Key"),
            ui::header_cell("Hits"),
            ui::header_cell("Misses"),
            ui::header_cell("Invalidations"),
            ui::header_cell("Hit Rate"),
            ui::header_cell("Cached"),
            ui::header_cell("Size (KB)"),
        ]);
        for (key, stats) in &self.keys {
            table.add_row(vec![
                Cell::new(key),
                Cell::new(stats.hits),
                Cell::new(stats.misses),
                Cell::new(stats.invalidations),
                ui::change_cell(stats.hit_rate * 100.0),
                Cell::new(if stats.cached { "yes" } else { "no" }),
                ui::amount_cell(stats.size_kb),
            ]);
        }
        format!(
            "{}\n{}\n\n{}",
            ui::style_text("Cache", ui::StyleType::Title),
            ui::style_text(
                &format!(
                    "TTL {}s, max entry {:.2} MB",
                    self.ttl_seconds, self.max_entry_mb
                ),
                ui::StyleType::Subtle
            ),
            table
        )
    }
}

pub async fn run(service: &PortfolioService) -> Result<()> {
    ui::print_separator();
    println!("{}", service.cache_stats().await.display_as_table());
    Ok(())
}
