//! Price comparison between a domain and the registrar price list

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{format_usd, price_or_zero};
use super::price::RegistrarPrice;
use super::registration::Domain;

/// A domain augmented with the cheapest known alternative for its TLD
///
/// The comparison fields are all None when no price exists for the TLD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWithComparison {
    #[serde(flatten)]
    pub domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_registrar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_amount: Option<Decimal>,
}

impl DomainWithComparison {
    /// Wrap a domain without comparison data
    pub fn without_comparison(domain: Domain) -> Self {
        Self {
            domain,
            best_price: None,
            best_registrar: None,
            savings: None,
            savings_amount: None,
        }
    }

    /// Whether pricing data existed for this domain's TLD
    pub fn has_comparison(&self) -> bool {
        self.best_registrar.is_some()
    }

    /// Compared and nothing cheaper is known
    pub fn is_optimal(&self) -> bool {
        self.has_comparison() && !self.has_savings()
    }

    pub fn has_savings(&self) -> bool {
        self.savings_amount.is_some_and(|s| s > Decimal::ZERO)
    }
}

/// Pick the entry with the lowest renewal price
///
/// Ties keep the first entry in input order.
pub fn select_cheapest(prices: &[RegistrarPrice]) -> Option<&RegistrarPrice> {
    prices.iter().fold(None, |best: Option<&RegistrarPrice>, current| match best {
        Some(b) if current.renewal_price < b.renewal_price => Some(current),
        Some(b) => Some(b),
        None => Some(current),
    })
}

/// Compare a domain against the price entries for its TLD
///
/// `matching_prices` must already be filtered to the domain's TLD. Never
/// fails: an empty list leaves the domain without comparison fields and an
/// unknown current price counts as zero.
pub fn compare_domain(domain: Domain, matching_prices: &[RegistrarPrice]) -> DomainWithComparison {
    let Some(cheapest) = select_cheapest(matching_prices) else {
        return DomainWithComparison::without_comparison(domain);
    };

    let current_price = price_or_zero(domain.renewal_price);
    let best_price = cheapest.renewal_price;
    let savings_amount = (current_price - best_price).max(Decimal::ZERO);

    DomainWithComparison {
        best_price: Some(format_usd(best_price)),
        best_registrar: Some(cheapest.registrar.clone()),
        savings: Some(format_usd(savings_amount)),
        savings_amount: Some(savings_amount),
        domain,
    }
}
