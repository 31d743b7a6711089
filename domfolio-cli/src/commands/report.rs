//! Report command - export the transfer plan

use std::path::Path;

use anyhow::Result;

use domfolio_core::services::ReportFormat;

use super::{get_context, log_change};
use crate::output;

fn parse_format(value: &str) -> Result<ReportFormat> {
    match value.to_ascii_lowercase().as_str() {
        "csv" => Ok(ReportFormat::Csv),
        "json" => Ok(ReportFormat::Json),
        other => anyhow::bail!("Unknown report format '{}' (use csv or json)", other),
    }
}

pub fn run(path: &Path, format: Option<&str>, json: bool) -> Result<()> {
    let format = format.map(parse_format).transpose()?;

    let ctx = get_context()?;
    let result = ctx
        .report_service
        .export_transfer_plan(ctx.user_id(), path, format)?;
    log_change("report_exported", "domain", result.rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "Wrote {} transfer(s) to {}",
        result.rows,
        result.path.display()
    ));
    println!(
        "  Total annual savings: {}",
        domfolio_core::domain::money::format_usd(result.total_savings)
    );

    Ok(())
}
