//! Savings recommendations derived from compared domains

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::comparison::DomainWithComparison;
use super::money::format_usd;
use super::stats::is_expiring_soon;

/// One recommended registrar transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOpportunity {
    pub domain: String,
    pub current_registrar: String,
    pub current_price: Option<Decimal>,
    pub recommended_registrar: String,
    pub best_price: String,
    pub annual_savings: Decimal,
    pub expiry_date: NaiveDate,
    pub expiring_soon: bool,
}

/// Savings overview for a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    /// Domains with positive savings, largest first
    pub opportunities: Vec<TransferOpportunity>,
    pub total_savings: Decimal,
    pub total_savings_display: String,
    /// Domains already at the cheapest known price
    pub optimal_count: usize,
    /// Domains whose TLD has no pricing data
    pub unpriced_count: usize,
    pub expiring_soon: usize,
}

/// Build the savings overview
///
/// Opportunities are ordered by savings descending; equal savings keep
/// portfolio order.
pub fn summarize_savings(domains: &[DomainWithComparison], now: DateTime<Utc>) -> SavingsSummary {
    let mut opportunities: Vec<TransferOpportunity> = domains
        .iter()
        .filter(|d| d.has_savings())
        .filter_map(|d| {
            Some(TransferOpportunity {
                domain: d.domain.full_name(),
                current_registrar: d.domain.registrar.clone(),
                current_price: d.domain.renewal_price,
                recommended_registrar: d.best_registrar.clone()?,
                best_price: d.best_price.clone()?,
                annual_savings: d.savings_amount?,
                expiry_date: d.domain.expiry_date,
                expiring_soon: is_expiring_soon(d.domain.expiry_date, now),
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.annual_savings.cmp(&a.annual_savings));

    let total_savings: Decimal = opportunities.iter().map(|o| o.annual_savings).sum();

    SavingsSummary {
        total_savings_display: format_usd(total_savings),
        total_savings,
        optimal_count: domains.iter().filter(|d| d.is_optimal()).count(),
        unpriced_count: domains.iter().filter(|d| !d.has_comparison()).count(),
        expiring_soon: domains
            .iter()
            .filter(|d| is_expiring_soon(d.domain.expiry_date, now))
            .count(),
        opportunities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::compare_domain;
    use crate::domain::price::RegistrarPrice;
    use crate::domain::registration::{Domain, NewDomain};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn domain(name: &str, tld: &str, price: Decimal, expiry: NaiveDate) -> Domain {
        Domain::from_new(&NewDomain {
            user_id: "user-1".to_string(),
            domain_name: name.to_string(),
            tld: tld.to_string(),
            registrar: "GoDaddy".to_string(),
            expiry_date: expiry,
            renewal_price: Some(price),
            privacy_cost: None,
        })
    }

    fn price(registrar: &str, tld: &str, renewal: Decimal) -> RegistrarPrice {
        RegistrarPrice {
            id: Uuid::new_v4(),
            registrar: registrar.to_string(),
            tld: tld.to_string(),
            renewal_price: renewal,
            privacy_price: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_summary_orders_by_savings() {
        let later = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let soon = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let com = vec![price("Cloudflare", ".com", dec!(9.15))];
        let io = vec![price("Porkbun", ".io", dec!(32.44))];

        let domains = vec![
            compare_domain(domain("small", ".com", dec!(10.15), later), &com),
            compare_domain(domain("big", ".io", dec!(59.99), soon), &io),
            compare_domain(domain("cheap", ".com", dec!(9.15), later), &com),
            compare_domain(domain("unknown", ".xyz", dec!(12.00), later), &[]),
        ];

        let summary = summarize_savings(&domains, now());

        assert_eq!(summary.opportunities.len(), 2);
        assert_eq!(summary.opportunities[0].domain, "big.io");
        assert_eq!(summary.opportunities[0].annual_savings, dec!(27.55));
        assert!(summary.opportunities[0].expiring_soon);
        assert_eq!(summary.opportunities[1].domain, "small.com");
        assert_eq!(summary.total_savings, dec!(28.55));
        assert_eq!(summary.total_savings_display, "$28.55");
        assert_eq!(summary.optimal_count, 1);
        assert_eq!(summary.unpriced_count, 1);
        assert_eq!(summary.expiring_soon, 1);
    }

    #[test]
    fn test_summary_empty() {
        let summary = summarize_savings(&[], now());
        assert!(summary.opportunities.is_empty());
        assert_eq!(summary.total_savings, Decimal::ZERO);
        assert_eq!(summary.total_savings_display, "$0.00");
    }
}
