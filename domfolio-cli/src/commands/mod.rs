//! CLI command implementations

pub mod doctor;
pub mod domains;
pub mod import;
pub mod logs;
pub mod prices;
pub mod report;
pub mod savings;
pub mod status;
pub mod user;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use domfolio_core::domain::money::parse_amount;
use domfolio_core::services::{EntryPoint, LogEvent, LoggingService};
use domfolio_core::DomfolioContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the application directory from `DOMFOLIO_DIR` or `~/.domfolio`
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("DOMFOLIO_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".domfolio"))
        .context("Could not find home directory (set DOMFOLIO_DIR)")
}

/// Get or create the domfolio context
pub fn get_context() -> Result<DomfolioContext> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create domfolio directory: {:?}", app_dir))?;

    DomfolioContext::new(&app_dir).context("Failed to initialize domfolio context")
}

/// Record a successful change: what kind of record and how many
pub fn log_change(event: &str, subject: &str, count: usize) {
    log_event(
        &get_logger(),
        LogEvent::new(event).with_subject(subject).with_count(count),
    );
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Use YYYY-MM-DD", value))
}

/// Parse a money argument ("12.99", "$12.99")
pub fn parse_money_arg(value: &str) -> Result<Decimal> {
    parse_amount(value).ok_or_else(|| anyhow::anyhow!("Invalid amount '{}'", value))
}

/// Parse an optional money argument where "none" or "" clears the value
pub fn parse_optional_money_arg(value: &str) -> Result<Option<Decimal>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_money_arg(trimmed).map(Some)
}

/// "$12.99" or "-" for missing amounts
pub fn display_money(amount: Option<Decimal>) -> String {
    amount
        .map(domfolio_core::domain::money::format_usd)
        .unwrap_or_else(|| "-".to_string())
}
