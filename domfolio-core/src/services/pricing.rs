//! Pricing service - registrar price table management

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::sample::sample_registrar_prices;
use crate::domain::money::parse_amount;
use crate::domain::result::Error;
use crate::domain::{normalize_tld, NewRegistrarPrice, RegistrarPrice};
use crate::ports::PriceTable;

pub struct PricingService {
    prices: Arc<dyn PriceTable>,
}

/// Outcome of a price CSV import
#[derive(Debug, Default, Serialize)]
pub struct PriceImportResult {
    pub imported: usize,
    pub skipped: usize,
    /// "line N: reason" for every skipped row
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    registrar: String,
    tld: String,
    renewal_price: String,
    #[serde(default)]
    privacy_price: Option<String>,
}

impl PricingService {
    pub fn new(prices: Arc<dyn PriceTable>) -> Self {
        Self { prices }
    }

    /// Price entries, optionally for one TLD
    ///
    /// A TLD filter returns that TLD's entries cheapest first; otherwise
    /// entries are grouped by TLD, cheapest first within each.
    pub fn list(&self, tld: Option<&str>) -> Result<Vec<RegistrarPrice>> {
        let mut prices = match tld {
            Some(tld) => self.prices.get_prices_for_tld(&normalize_tld(tld))?,
            None => self.prices.get_registrar_prices()?,
        };
        prices.sort_by(|a, b| {
            a.tld
                .cmp(&b.tld)
                .then_with(|| a.renewal_price.cmp(&b.renewal_price))
        });
        Ok(prices)
    }

    /// Distinct TLDs present in the price table
    pub fn priced_tlds(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .prices
            .get_registrar_prices()?
            .into_iter()
            .map(|p| p.tld)
            .collect())
    }

    /// Insert or replace the price for (registrar, tld)
    pub fn set(&self, price: NewRegistrarPrice) -> Result<RegistrarPrice> {
        let price = NewRegistrarPrice {
            registrar: price.registrar.trim().to_string(),
            tld: normalize_tld(&price.tld),
            ..price
        };
        price.validate()?;
        let saved = self
            .prices
            .upsert_price(&price)
            .context("Failed to save price")?;
        Ok(saved)
    }

    /// Remove the price for (registrar, tld); NotFound when absent
    pub fn remove(&self, registrar: &str, tld: &str) -> Result<()> {
        let tld = normalize_tld(tld);
        if !self.prices.delete_price(registrar.trim(), &tld)? {
            return Err(Error::not_found(format!("price for {} {}", registrar, tld)).into());
        }
        Ok(())
    }

    /// Upsert the built-in sample price list; safe to run repeatedly
    pub fn load_sample_prices(&self) -> Result<usize> {
        let samples = sample_registrar_prices();
        for price in &samples {
            self.prices.upsert_price(price)?;
        }
        Ok(samples.len())
    }

    /// Import prices from a CSV with headers
    /// `registrar,tld,renewal_price[,privacy_price]`
    ///
    /// Invalid rows are skipped and reported; valid rows are upserted.
    pub fn import_prices(&self, path: &Path) -> Result<PriceImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to read CSV file {}", path.display()))?;

        let mut result = PriceImportResult::default();

        for record in reader.deserialize::<PriceRow>() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    result.skipped += 1;
                    result.errors.push(format!("line {}: {}", line, e));
                    continue;
                }
            };

            match self.import_row(&row) {
                Ok(()) => result.imported += 1,
                Err(e) => {
                    result.skipped += 1;
                    result
                        .errors
                        .push(format!("{} {}: {}", row.registrar, row.tld, e));
                }
            }
        }

        Ok(result)
    }

    fn import_row(&self, row: &PriceRow) -> Result<()> {
        let renewal = parse_amount(&row.renewal_price)
            .ok_or_else(|| Error::validation(format!("invalid price '{}'", row.renewal_price)))?;
        let privacy = match row.privacy_price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_amount(raw)
                    .ok_or_else(|| Error::validation(format!("invalid price '{}'", raw)))?,
            ),
        };
        self.set(NewRegistrarPrice::new(
            row.registrar.as_str(),
            row.tld.as_str(),
            renewal,
            privacy,
        ))?;
        Ok(())
    }
}
