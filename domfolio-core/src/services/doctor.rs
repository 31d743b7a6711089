//! Doctor service - portfolio health checks

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::stats::is_expiring_soon;
use crate::ports::{DomainStore, PriceTable};

pub struct DoctorService {
    domains: Arc<dyn DomainStore>,
    prices: Arc<dyn PriceTable>,
}

impl DoctorService {
    pub fn new(domains: Arc<dyn DomainStore>, prices: Arc<dyn PriceTable>) -> Self {
        Self { domains, prices }
    }

    /// Run all health checks for a user's portfolio
    pub fn run_checks(&self, user_id: &str) -> Result<DoctorResult> {
        self.run_checks_at(user_id, Utc::now())
    }

    pub fn run_checks_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<DoctorResult> {
        let domains = self.domains.get_user_domains(user_id)?;
        let prices = self.prices.get_registrar_prices()?;
        let today = now.date_naive();
        let mut checks = HashMap::new();

        // Price table populated
        checks.insert(
            "price_table".to_string(),
            if prices.is_empty() {
                CheckResult::warning("No registrar prices loaded (try `prices load-sample`)", vec![])
            } else {
                CheckResult::pass(format!("{} registrar price(s) loaded", prices.len()))
            },
        );

        // Domains with no known renewal price compare as if renewing for free
        let unknown: Vec<serde_json::Value> = domains
            .iter()
            .filter(|d| d.renewal_price.is_none())
            .map(|d| json!({ "domain": d.full_name(), "registrar": d.registrar }))
            .collect();
        checks.insert(
            "unknown_renewal_price".to_string(),
            if unknown.is_empty() {
                CheckResult::pass("All domains have a renewal price")
            } else {
                CheckResult::warning(
                    format!("{} domain(s) have no renewal price", unknown.len()),
                    unknown,
                )
            },
        );

        // TLDs with no pricing data
        let priced: HashSet<&str> = prices.iter().map(|p| p.tld.as_str()).collect();
        let mut unpriced: BTreeMap<&str, usize> = BTreeMap::new();
        for domain in domains.iter().filter(|d| !priced.contains(d.tld.as_str())) {
            *unpriced.entry(domain.tld.as_str()).or_default() += 1;
        }
        checks.insert(
            "unpriced_tlds".to_string(),
            if unpriced.is_empty() {
                CheckResult::pass("Every TLD in the portfolio has pricing data")
            } else {
                CheckResult::warning(
                    format!("{} TLD(s) have no pricing data", unpriced.len()),
                    unpriced
                        .iter()
                        .map(|(tld, count)| json!({ "tld": tld, "domains": count }))
                        .collect(),
                )
            },
        );

        // Already expired
        let expired: Vec<serde_json::Value> = domains
            .iter()
            .filter(|d| d.expiry_date < today)
            .map(|d| json!({ "domain": d.full_name(), "expiry_date": d.expiry_date.to_string() }))
            .collect();
        checks.insert(
            "expired_domains".to_string(),
            if expired.is_empty() {
                CheckResult::pass("No expired domains")
            } else {
                CheckResult::error(format!("{} domain(s) have expired", expired.len()), expired)
            },
        );

        // Expiring within the look-ahead window (not yet expired)
        let expiring: Vec<serde_json::Value> = domains
            .iter()
            .filter(|d| d.expiry_date >= today && is_expiring_soon(d.expiry_date, now))
            .map(|d| json!({ "domain": d.full_name(), "expiry_date": d.expiry_date.to_string() }))
            .collect();
        checks.insert(
            "expiring_soon".to_string(),
            if expiring.is_empty() {
                CheckResult::pass("No domains expiring in the next 30 days")
            } else {
                CheckResult::warning(
                    format!("{} domain(s) expire within 30 days", expiring.len()),
                    expiring,
                )
            },
        );

        // Same name and TLD entered more than once
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for domain in &domains {
            *counts.entry(domain.full_name().to_lowercase()).or_default() += 1;
        }
        let duplicates: Vec<serde_json::Value> = counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(name, count)| json!({ "domain": name, "count": count }))
            .collect();
        checks.insert(
            "duplicate_domains".to_string(),
            if duplicates.is_empty() {
                CheckResult::pass("No duplicate domains")
            } else {
                CheckResult::warning(
                    format!("{} domain(s) are listed more than once", duplicates.len()),
                    duplicates,
                )
            },
        );

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: HashMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: "pass".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warning(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self::failed("warning", message, details)
    }

    fn error(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self::failed("error", message, details)
    }

    fn failed(status: &str, message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            details: if details.is_empty() { None } else { Some(details) },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}
