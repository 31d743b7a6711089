//! Report service - transfer plan export

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{SavingsSummary, TransferOpportunity};
use crate::services::PortfolioService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// `.json` means JSON; anything else is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResult {
    pub path: PathBuf,
    pub format: ReportFormat,
    pub rows: usize,
    pub total_savings: Decimal,
}

/// One CSV row; money as plain decimals
#[derive(Debug, Serialize)]
struct TransferPlanRow<'a> {
    domain: &'a str,
    current_registrar: &'a str,
    current_price: String,
    recommended_registrar: &'a str,
    best_price: String,
    annual_savings: String,
    expiry_date: String,
}

impl<'a> From<&'a TransferOpportunity> for TransferPlanRow<'a> {
    fn from(o: &'a TransferOpportunity) -> Self {
        Self {
            domain: &o.domain,
            current_registrar: &o.current_registrar,
            current_price: o.current_price.map(|p| p.to_string()).unwrap_or_default(),
            recommended_registrar: &o.recommended_registrar,
            best_price: o.best_price.trim_start_matches('$').to_string(),
            annual_savings: o.annual_savings.to_string(),
            expiry_date: o.expiry_date.to_string(),
        }
    }
}

pub struct ReportService {
    portfolio: Arc<PortfolioService>,
}

impl ReportService {
    pub fn new(portfolio: Arc<PortfolioService>) -> Self {
        Self { portfolio }
    }

    /// Write the user's transfer plan to `path`
    ///
    /// The format follows the file extension unless given explicitly.
    pub fn export_transfer_plan(
        &self,
        user_id: &str,
        path: &Path,
        format: Option<ReportFormat>,
    ) -> Result<ReportResult> {
        let summary = self.portfolio.savings_summary(user_id)?;
        let format = format.unwrap_or_else(|| ReportFormat::from_path(path));

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        match format {
            ReportFormat::Csv => write_csv(&summary, file)?,
            ReportFormat::Json => write_json(&summary, file)?,
        }

        Ok(ReportResult {
            path: path.to_path_buf(),
            format,
            rows: summary.opportunities.len(),
            total_savings: summary.total_savings,
        })
    }
}

/// Transfer plan as CSV with a header row
pub fn write_csv<W: Write>(summary: &SavingsSummary, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if summary.opportunities.is_empty() {
        // serialize() only emits headers alongside the first row
        csv_writer.write_record([
            "domain",
            "current_registrar",
            "current_price",
            "recommended_registrar",
            "best_price",
            "annual_savings",
            "expiry_date",
        ])?;
    }
    for opportunity in &summary.opportunities {
        csv_writer.serialize(TransferPlanRow::from(opportunity))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// The full savings summary as pretty JSON
pub fn write_json<W: Write>(summary: &SavingsSummary, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}
