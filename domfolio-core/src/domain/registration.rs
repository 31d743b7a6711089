//! Registered domain model

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::check_amount;
use super::result::{Error, Result};

/// A registered domain in a user's portfolio
///
/// `domain_name` is the label without its suffix ("example"), `tld` is the
/// suffix including the leading dot (".com", ".co.uk").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    pub user_id: String,
    pub domain_name: String,
    pub tld: String,
    pub registrar: String,
    pub expiry_date: NaiveDate,
    /// Current annual renewal price, None when unknown
    pub renewal_price: Option<Decimal>,
    pub privacy_cost: Option<Decimal>,
    pub last_checked: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    /// Materialize a new domain record from an insert payload
    pub fn from_new(new: &NewDomain) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id.clone(),
            domain_name: new.domain_name.clone(),
            tld: new.tld.clone(),
            registrar: new.registrar.clone(),
            expiry_date: new.expiry_date,
            renewal_price: new.renewal_price,
            privacy_cost: new.privacy_cost,
            last_checked: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fully qualified name, e.g. "example.com"
    pub fn full_name(&self) -> String {
        format!("{}{}", self.domain_name, self.tld)
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply(&mut self, update: &DomainUpdate) {
        if let Some(name) = &update.domain_name {
            self.domain_name = name.clone();
        }
        if let Some(tld) = &update.tld {
            self.tld = tld.clone();
        }
        if let Some(registrar) = &update.registrar {
            self.registrar = registrar.clone();
        }
        if let Some(expiry) = update.expiry_date {
            self.expiry_date = expiry;
        }
        if let Some(price) = update.renewal_price {
            self.renewal_price = price;
        }
        if let Some(cost) = update.privacy_cost {
            self.privacy_cost = cost;
        }
        self.updated_at = Utc::now();
    }

    /// Validate domain data
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.domain_name,
            &self.tld,
            &self.registrar,
            self.renewal_price,
            self.privacy_cost,
        )
    }
}

/// Insert payload for a domain (ids and timestamps are assigned by the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDomain {
    pub user_id: String,
    pub domain_name: String,
    pub tld: String,
    pub registrar: String,
    pub expiry_date: NaiveDate,
    pub renewal_price: Option<Decimal>,
    pub privacy_cost: Option<Decimal>,
}

impl NewDomain {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::validation("user id cannot be empty"));
        }
        validate_fields(
            &self.domain_name,
            &self.tld,
            &self.registrar,
            self.renewal_price,
            self.privacy_cost,
        )
    }
}

/// Partial update for a domain
///
/// Price fields are doubly optional: `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainUpdate {
    pub domain_name: Option<String>,
    pub tld: Option<String>,
    pub registrar: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub renewal_price: Option<Option<Decimal>>,
    pub privacy_cost: Option<Option<Decimal>>,
}

impl DomainUpdate {
    pub fn is_empty(&self) -> bool {
        self.domain_name.is_none()
            && self.tld.is_none()
            && self.registrar.is_none()
            && self.expiry_date.is_none()
            && self.renewal_price.is_none()
            && self.privacy_cost.is_none()
    }
}

/// Ensure a TLD carries its leading dot (" com " -> ".com")
///
/// Case is preserved: price matching is case-sensitive.
pub fn normalize_tld(tld: &str) -> String {
    let trimmed = tld.trim();
    if trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

/// Split a fully qualified name at its first dot ("example.co.uk" -> ("example", ".co.uk"))
pub fn split_domain(full: &str) -> Option<(String, String)> {
    let full = full.trim().trim_end_matches('.');
    let (name, rest) = full.split_once('.')?;
    if name.is_empty() || rest.is_empty() {
        return None;
    }
    Some((name.to_string(), format!(".{}", rest)))
}

/// Validate a TLD string: leading dot, dot-separated alphanumeric labels
pub fn validate_tld(tld: &str) -> Result<()> {
    let re = Regex::new(r"^(\.[A-Za-z0-9-]+)+$").map_err(|e| Error::Other(e.to_string()))?;
    if !re.is_match(tld) {
        return Err(Error::validation(format!(
            "invalid TLD '{}': expected a leading dot, e.g. .com",
            tld
        )));
    }
    Ok(())
}

fn validate_fields(
    domain_name: &str,
    tld: &str,
    registrar: &str,
    renewal_price: Option<Decimal>,
    privacy_cost: Option<Decimal>,
) -> Result<()> {
    let label = Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .map_err(|e| Error::Other(e.to_string()))?;
    if domain_name.trim().is_empty() {
        return Err(Error::validation("domain name cannot be empty"));
    }
    if !label.is_match(domain_name) {
        return Err(Error::validation(format!(
            "invalid domain name '{}': use letters, digits and hyphens without the TLD",
            domain_name
        )));
    }
    validate_tld(tld)?;
    if registrar.trim().is_empty() {
        return Err(Error::validation("registrar cannot be empty"));
    }
    if let Some(price) = renewal_price {
        check_amount("renewal price", price)?;
    }
    if let Some(cost) = privacy_cost {
        check_amount("privacy cost", cost)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_domain() -> NewDomain {
        NewDomain {
            user_id: "user-1".to_string(),
            domain_name: "example".to_string(),
            tld: ".com".to_string(),
            registrar: "GoDaddy".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            renewal_price: Some(dec!(17.99)),
            privacy_cost: None,
        }
    }

    #[test]
    fn test_new_domain_validation() {
        assert!(new_domain().validate().is_ok());

        let mut d = new_domain();
        d.domain_name = "".to_string();
        assert!(d.validate().is_err());

        let mut d = new_domain();
        d.domain_name = "example.com".to_string();
        assert!(d.validate().is_err());

        let mut d = new_domain();
        d.tld = "com".to_string();
        assert!(d.validate().is_err());

        let mut d = new_domain();
        d.registrar = "  ".to_string();
        assert!(d.validate().is_err());

        let mut d = new_domain();
        d.renewal_price = Some(dec!(-1));
        assert!(d.validate().is_err());

        let mut d = new_domain();
        d.user_id = "".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_amounts_must_fit_storage() {
        let mut d = new_domain();
        d.renewal_price = Some(dec!(99999999.99));
        assert!(d.validate().is_ok());

        let mut d = new_domain();
        d.renewal_price = Some(dec!(123456789));
        assert!(matches!(d.validate(), Err(Error::Validation(_))));

        let mut d = new_domain();
        d.privacy_cost = Some(dec!(100000000));
        assert!(matches!(d.validate(), Err(Error::Validation(_))));

        let mut domain = Domain::from_new(&new_domain());
        domain.apply(&DomainUpdate {
            renewal_price: Some(Some(dec!(500000000))),
            ..Default::default()
        });
        assert!(matches!(domain.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_multi_label_tld_is_valid() {
        let mut d = new_domain();
        d.tld = ".co.uk".to_string();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_apply_update() {
        let mut domain = Domain::from_new(&new_domain());
        let before = domain.updated_at;

        domain.apply(&DomainUpdate {
            registrar: Some("Cloudflare".to_string()),
            renewal_price: Some(None),
            ..Default::default()
        });

        assert_eq!(domain.registrar, "Cloudflare");
        assert_eq!(domain.renewal_price, None);
        assert_eq!(domain.domain_name, "example");
        assert!(domain.updated_at >= before);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(DomainUpdate::default().is_empty());
        let update = DomainUpdate {
            privacy_cost: Some(Some(dec!(2.88))),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_normalize_tld() {
        assert_eq!(normalize_tld("com"), ".com");
        assert_eq!(normalize_tld(" .io "), ".io");
        assert_eq!(normalize_tld("COM"), ".COM");
    }

    #[test]
    fn test_split_domain() {
        assert_eq!(
            split_domain("example.com"),
            Some(("example".to_string(), ".com".to_string()))
        );
        assert_eq!(
            split_domain("shop.co.uk"),
            Some(("shop".to_string(), ".co.uk".to_string()))
        );
        assert_eq!(split_domain("localhost"), None);
        assert_eq!(split_domain(".com"), None);
    }

    #[test]
    fn test_full_name() {
        let domain = Domain::from_new(&new_domain());
        assert_eq!(domain.full_name(), "example.com");
    }
}
