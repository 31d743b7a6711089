//! Registrar price list entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::check_amount;
use super::registration::validate_tld;
use super::result::{Error, Result};

/// Renewal pricing offered by one registrar for one TLD
///
/// (registrar, tld) is unique across the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrarPrice {
    pub id: Uuid,
    pub registrar: String,
    pub tld: String,
    pub renewal_price: Decimal,
    pub privacy_price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
}

/// Upsert payload for a registrar price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegistrarPrice {
    pub registrar: String,
    pub tld: String,
    pub renewal_price: Decimal,
    pub privacy_price: Option<Decimal>,
}

impl NewRegistrarPrice {
    pub fn new(
        registrar: impl Into<String>,
        tld: impl Into<String>,
        renewal_price: Decimal,
        privacy_price: Option<Decimal>,
    ) -> Self {
        Self {
            registrar: registrar.into(),
            tld: tld.into(),
            renewal_price,
            privacy_price,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registrar.trim().is_empty() {
            return Err(Error::validation("registrar cannot be empty"));
        }
        validate_tld(&self.tld)?;
        check_amount("renewal price", self.renewal_price)?;
        if let Some(privacy) = self.privacy_price {
            check_amount("privacy price", privacy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_validation() {
        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(9.15), Some(dec!(0)));
        assert!(price.validate().is_ok());

        let price = NewRegistrarPrice::new("", ".com", dec!(9.15), None);
        assert!(price.validate().is_err());

        let price = NewRegistrarPrice::new("Cloudflare", "com", dec!(9.15), None);
        assert!(price.validate().is_err());

        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(-0.01), None);
        assert!(price.validate().is_err());

        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(9.15), Some(dec!(-2)));
        assert!(price.validate().is_err());
    }

    #[test]
    fn test_oversized_price_is_rejected() {
        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(123456789), None);
        assert!(matches!(price.validate(), Err(Error::Validation(_))));

        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(9.15), Some(dec!(100000000)));
        assert!(matches!(price.validate(), Err(Error::Validation(_))));

        let price = NewRegistrarPrice::new("Cloudflare", ".com", dec!(99999999.99), None);
        assert!(price.validate().is_ok());
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let price = NewRegistrarPrice::new("Promo", ".xyz", Decimal::ZERO, None);
        assert!(price.validate().is_ok());
    }
}
