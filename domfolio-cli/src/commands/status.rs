//! Status command - show portfolio status and summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use domfolio_core::domain::EXPIRING_SOON_DAYS;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status(ctx.user_id())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Domain Portfolio Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["User", status.user_id.as_str()]);
    table.add_row(vec!["Domains", &status.stats.total_domains.to_string()]);
    table.add_row(vec!["Registrars", &status.stats.registrar_count.to_string()]);
    table.add_row(vec!["Expiring soon", &status.stats.expiring_soon.to_string()]);
    table.add_row(vec!["Potential savings", status.total_savings_display.as_str()]);
    table.add_row(vec!["Price entries", &status.price_entries.to_string()]);
    table.add_row(vec![
        "Database size",
        &output::format_size(ctx.repository.get_db_size()?),
    ]);

    println!("{}", table);
    println!();

    if !status.registrars.is_empty() {
        println!("{}", "Registrars".bold());
        for registrar in &status.registrars {
            println!("  • {} ({})", registrar.name, registrar.domains);
        }
        println!();
    }

    if status.priced_tlds.is_empty() {
        output::warning("No registrar prices loaded. Run `domfolio prices load-sample` to get started.");
    } else {
        println!("Priced TLDs: {}", status.priced_tlds.join(", "));
    }

    if status.stats.expiring_soon > 0 {
        output::warning(&format!(
            "{} domain(s) expire within {} days",
            status.stats.expiring_soon, EXPIRING_SOON_DAYS
        ));
    }

    Ok(())
}
