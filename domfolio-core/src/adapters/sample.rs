//! Built-in sample registrar price list
//!
//! A small reference table covering the common TLDs, loaded on request so a
//! fresh install can show comparisons before any prices are entered.

use rust_decimal::Decimal;

use crate::domain::NewRegistrarPrice;

/// (registrar, tld, renewal cents, privacy cents)
const SAMPLE_PRICES: &[(&str, &str, i64, Option<i64>)] = &[
    ("Cloudflare", ".com", 915, Some(0)),
    ("Namecheap", ".com", 1298, Some(288)),
    ("GoDaddy", ".com", 1799, Some(999)),
    ("Porkbun", ".com", 1198, Some(0)),
    ("Cloudflare", ".io", 4000, Some(0)),
    ("Namecheap", ".io", 4888, Some(288)),
    ("GoDaddy", ".io", 5999, Some(999)),
    ("Porkbun", ".io", 3244, Some(0)),
    ("Cloudflare", ".dev", 1350, Some(0)),
    ("Namecheap", ".dev", 1298, Some(288)),
    ("GoDaddy", ".dev", 1799, Some(999)),
    ("Squarespace", ".dev", 1499, Some(800)),
    ("Cloudflare", ".org", 1015, Some(0)),
    ("Namecheap", ".org", 1498, Some(288)),
    ("GoDaddy", ".org", 1899, Some(999)),
    ("Porkbun", ".org", 1298, Some(0)),
];

/// The sample price list as upsert payloads
pub fn sample_registrar_prices() -> Vec<NewRegistrarPrice> {
    SAMPLE_PRICES
        .iter()
        .map(|&(registrar, tld, renewal, privacy)| {
            NewRegistrarPrice::new(
                registrar,
                tld,
                Decimal::new(renewal, 2),
                privacy.map(|p| Decimal::new(p, 2)),
            )
        })
        .collect()
}
