//! Portfolio-wide statistics

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::comparison::DomainWithComparison;

/// Look-ahead window for "expiring soon", in days (inclusive)
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Summary statistics for one user's portfolio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_domains: usize,
    pub total_savings: Decimal,
    pub expiring_soon: usize,
    pub registrar_count: usize,
}

/// Last expiry date that still counts as expiring soon at `now`
pub fn expiring_soon_cutoff(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::days(EXPIRING_SOON_DAYS)).date_naive()
}

/// Whether a domain expires within the look-ahead window
///
/// Already-expired domains also satisfy this.
pub fn is_expiring_soon(expiry_date: NaiveDate, now: DateTime<Utc>) -> bool {
    expiry_date <= expiring_soon_cutoff(now)
}

/// Fold compared domains into portfolio statistics
///
/// `now` is injected so the result only depends on the arguments.
pub fn aggregate(domains: &[DomainWithComparison], now: DateTime<Utc>) -> PortfolioStats {
    let cutoff = expiring_soon_cutoff(now);

    let total_savings: Decimal = domains
        .iter()
        .map(|d| d.savings_amount.unwrap_or(Decimal::ZERO))
        .sum();

    let expiring_soon = domains
        .iter()
        .filter(|d| d.domain.expiry_date <= cutoff)
        .count();

    let registrars: HashSet<&str> = domains.iter().map(|d| d.domain.registrar.as_str()).collect();

    PortfolioStats {
        total_domains: domains.len(),
        total_savings,
        expiring_soon,
        registrar_count: registrars.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::{Domain, NewDomain};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn entry(registrar: &str, expiry: NaiveDate, savings: Option<Decimal>) -> DomainWithComparison {
        let domain = Domain::from_new(&NewDomain {
            user_id: "user-1".to_string(),
            domain_name: "example".to_string(),
            tld: ".com".to_string(),
            registrar: registrar.to_string(),
            expiry_date: expiry,
            renewal_price: None,
            privacy_cost: None,
        });
        let mut d = DomainWithComparison::without_comparison(domain);
        d.savings_amount = savings;
        d
    }

    fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn test_empty_portfolio() {
        let stats = aggregate(&[], now());
        assert_eq!(
            stats,
            PortfolioStats {
                total_domains: 0,
                total_savings: Decimal::ZERO,
                expiring_soon: 0,
                registrar_count: 0,
            }
        );
    }

    #[test]
    fn test_total_savings_is_exact() {
        let domains = vec![
            entry("A", far_future(), Some(dec!(9.15))),
            entry("B", far_future(), Some(dec!(12.98))),
            entry("C", far_future(), Some(dec!(17.99))),
        ];
        let stats = aggregate(&domains, now());
        assert_eq!(stats.total_savings, dec!(40.12));
        assert_eq!(stats.total_savings.to_string(), "40.12");
    }

    #[test]
    fn test_absent_savings_count_as_zero() {
        let domains = vec![
            entry("A", far_future(), None),
            entry("A", far_future(), Some(dec!(8.84))),
        ];
        let stats = aggregate(&domains, now());
        assert_eq!(stats.total_savings, dec!(8.84));
        assert_eq!(stats.total_domains, 2);
    }

    #[test]
    fn test_expiring_soon_boundary() {
        let boundary = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let day_after = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

        let stats = aggregate(&[entry("A", boundary, None)], now());
        assert_eq!(stats.expiring_soon, 1);

        let stats = aggregate(&[entry("A", day_after, None)], now());
        assert_eq!(stats.expiring_soon, 0);
    }

    #[test]
    fn test_expired_domains_count_as_expiring_soon() {
        let expired = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let stats = aggregate(&[entry("A", expired, None)], now());
        assert_eq!(stats.expiring_soon, 1);
        assert!(is_expiring_soon(expired, now()));
    }

    #[test]
    fn test_registrar_count_is_distinct_and_case_sensitive() {
        let domains = vec![
            entry("Cloudflare", far_future(), None),
            entry("Cloudflare", far_future(), None),
            entry("Cloudflare", far_future(), None),
            entry("cloudflare", far_future(), None),
            entry("Namecheap", far_future(), None),
        ];
        let stats = aggregate(&domains, now());
        assert_eq!(stats.registrar_count, 3);
        assert_eq!(stats.total_domains, 5);
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(
            expiring_soon_cutoff(now()),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        );
    }
}
