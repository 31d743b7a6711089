//! Doctor command - portfolio health checks

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use serde_json::Value;

use super::get_context;
use crate::output;

/// One detail object as "key: value, key: value"
fn format_detail(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                _ => format!("{}: {}", k, v),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

pub fn run(verbose: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.doctor_service.run_checks(ctx.user_id())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if result.summary.errors > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("{}", "Portfolio Health Check".bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Check", "Status", "Message"]);

    let mut names: Vec<&String> = result.checks.keys().collect();
    names.sort();

    for check_name in names {
        let check = &result.checks[check_name];
        table.add_row(vec![
            Cell::new(check_name),
            output::check_status_cell(&check.status),
            Cell::new(&check.message),
        ]);

        if verbose {
            for detail in check.details.iter().flatten() {
                table.add_row(vec![
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(format!("  - {}", format_detail(detail))),
                ]);
            }
        }
    }

    println!("{}", table);
    println!();

    println!(
        "Summary: {} passed, {} warnings, {} errors",
        result.summary.passed.to_string().green(),
        result.summary.warnings.to_string().yellow(),
        result.summary.errors.to_string().red(),
    );

    if result.summary.errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_detail() {
        let detail = json!({ "domain": "example.com", "expiry_date": "2025-06-01" });
        let formatted = format_detail(&detail);
        assert!(formatted.contains("domain: example.com"));
        assert!(formatted.contains("expiry_date: 2025-06-01"));
        assert_eq!(format_detail(&json!({ "domains": 2 })), "domains: 2");
        assert_eq!(format_detail(&json!({ "tld": null })), "");
    }
}
