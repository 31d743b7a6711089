//! Domain service - validated, owner-scoped domain management

use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::domain::result::Error;
use crate::domain::{normalize_tld, split_domain, Domain, DomainUpdate, NewDomain, User};
use crate::ports::DomainStore;

pub struct DomainService {
    store: Arc<dyn DomainStore>,
}

impl DomainService {
    pub fn new(store: Arc<dyn DomainStore>) -> Self {
        Self { store }
    }

    /// Add a domain to a user's portfolio
    ///
    /// Trims text fields and adds a missing leading dot to the TLD before
    /// validating. The owning user record is created on first use.
    pub fn add(&self, new: NewDomain) -> Result<Domain> {
        let new = NewDomain {
            domain_name: new.domain_name.trim().to_string(),
            tld: normalize_tld(&new.tld),
            registrar: new.registrar.trim().to_string(),
            ..new
        };
        new.validate()?;

        self.ensure_user(&new.user_id)?;
        let domain = self
            .store
            .create_domain(&new)
            .context("Failed to save domain")?;
        Ok(domain)
    }

    /// A domain by id; NotFound when missing or owned by someone else
    pub fn get(&self, id: Uuid, user_id: &str) -> Result<Domain> {
        self.store
            .get_domain(id, user_id)?
            .ok_or_else(|| Error::not_found(format!("domain {}", id)).into())
    }

    /// Look a domain up by id or by full name ("example.com", case-insensitive)
    pub fn resolve(&self, user_id: &str, reference: &str) -> Result<Domain> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            return self.get(id, user_id);
        }

        let wanted = reference.to_lowercase();
        self.store
            .get_user_domains(user_id)?
            .into_iter()
            .find(|d| d.full_name().to_lowercase() == wanted)
            .ok_or_else(|| Error::not_found(format!("domain {}", reference)).into())
    }

    /// Apply a partial update after validating the resulting record
    pub fn update(&self, id: Uuid, user_id: &str, update: DomainUpdate) -> Result<Domain> {
        if update.is_empty() {
            return Err(Error::validation("nothing to update").into());
        }

        let update = DomainUpdate {
            domain_name: update.domain_name.map(|n| n.trim().to_string()),
            tld: update.tld.as_deref().map(normalize_tld),
            registrar: update.registrar.map(|r| r.trim().to_string()),
            ..update
        };

        let mut preview = self.get(id, user_id)?;
        preview.apply(&update);
        preview.validate()?;

        self.store
            .update_domain(id, user_id, &update)
            .context("Failed to update domain")?
            .ok_or_else(|| Error::not_found(format!("domain {}", id)).into())
    }

    /// Remove a domain; NotFound when nothing was deleted
    pub fn remove(&self, id: Uuid, user_id: &str) -> Result<()> {
        if !self.store.delete_domain(id, user_id)? {
            return Err(Error::not_found(format!("domain {}", id)).into());
        }
        Ok(())
    }

    fn ensure_user(&self, user_id: &str) -> Result<()> {
        if self.store.get_user(user_id)?.is_none() {
            self.store.upsert_user(&User::new(user_id))?;
        }
        Ok(())
    }
}

/// Split free-form input into (name, tld)
///
/// "example.com" splits at the first dot; a bare label takes `fallback_tld`.
pub fn parse_domain_input(input: &str, fallback_tld: Option<&str>) -> Option<(String, String)> {
    let input = input.trim();
    if input.contains('.') {
        return split_domain(input);
    }
    let tld = fallback_tld.map(str::trim).filter(|t| !t.is_empty())?;
    Some((input.to_string(), normalize_tld(tld)))
}
