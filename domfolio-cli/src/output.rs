//! Terminal output: messages, tables and the cells shared by the domain views

use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Table with the condensed UTF-8 preset, wrapping to the terminal width
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Savings column: green when a transfer saves money, "optimal" when the
/// domain is already at the cheapest registrar, "-" without price data
pub fn savings_cell(amount: Option<Decimal>, display: Option<&str>) -> Cell {
    match amount {
        Some(amount) if amount > Decimal::ZERO => {
            Cell::new(display.unwrap_or("-")).fg(Color::Green)
        }
        Some(_) => Cell::new("optimal").fg(Color::DarkGrey),
        None => Cell::new("-"),
    }
}

/// Expiry column, highlighted inside the expiring-soon window
pub fn expiry_cell(date: NaiveDate, expiring_soon: bool) -> Cell {
    let cell = Cell::new(date.format("%Y-%m-%d"));
    if expiring_soon {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

/// Doctor check status as a short colored label
pub fn check_status_cell(status: &str) -> Cell {
    match status {
        "pass" => Cell::new("PASS").fg(Color::Green),
        "warning" => Cell::new("WARN").fg(Color::Yellow),
        "error" => Cell::new("ERROR").fg(Color::Red),
        other => Cell::new(other),
    }
}

/// Database file size, e.g. "1.5 MB"
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
