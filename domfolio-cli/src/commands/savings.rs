//! Savings command - transfer opportunities and total annual savings

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use super::{display_money, get_context};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let summary = ctx.portfolio_service.savings_summary(ctx.user_id())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.opportunities.is_empty() {
        output::success("Every priced domain is already at the cheapest registrar.");
    } else {
        let mut table = output::create_table();
        table.set_header(vec![
            "Domain",
            "Current Registrar",
            "Current",
            "Move To",
            "Best",
            "Annual Savings",
            "Expires",
        ]);

        for o in &summary.opportunities {
            table.add_row(vec![
                Cell::new(&o.domain),
                Cell::new(&o.current_registrar),
                Cell::new(display_money(o.current_price)),
                Cell::new(&o.recommended_registrar),
                Cell::new(&o.best_price),
                output::savings_cell(Some(o.annual_savings), Some(&display_money(Some(o.annual_savings)))),
                output::expiry_cell(o.expiry_date, o.expiring_soon),
            ]);
        }
        println!("{}", table);
    }

    println!();
    println!(
        "Total annual savings: {}",
        summary.total_savings_display.green().bold()
    );
    println!("  Optimally priced: {}", summary.optimal_count);
    if summary.unpriced_count > 0 {
        println!(
            "  {}",
            format!("No pricing data: {}", summary.unpriced_count).dimmed()
        );
    }
    if summary.expiring_soon > 0 {
        output::warning(&format!("  Expiring soon: {}", summary.expiring_soon));
    }

    Ok(())
}
