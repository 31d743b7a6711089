//! In-memory store for tests and embedding
//!
//! Behaves like the DuckDB adapter: creation-order listing, owner-scoped
//! domain access, (registrar, tld) upsert that keeps the entry id. Money is
//! rounded to two decimal places on write and rejected when it would overflow
//! the DECIMAL(10,2) columns.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::domain::money::AMOUNT_LIMIT;
use crate::domain::result::{Error, Result};
use crate::domain::{Domain, DomainUpdate, NewDomain, NewRegistrarPrice, RegistrarPrice, User};
use crate::ports::{DomainStore, PriceTable};

#[derive(Default)]
pub struct MemoryRepository {
    users: Mutex<Vec<User>>,
    domains: Mutex<Vec<Domain>>,
    prices: Mutex<Vec<RegistrarPrice>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
}

/// Round to cents, failing like a DECIMAL(10,2) cast would
fn cents(amount: Decimal) -> Result<Decimal> {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() >= Decimal::from(AMOUNT_LIMIT) {
        return Err(Error::database(format!(
            "Conversion Error: {} does not fit DECIMAL(10,2)",
            amount
        )));
    }
    Ok(rounded)
}

fn stored_domain(new: &NewDomain) -> Result<Domain> {
    let mut domain = Domain::from_new(new);
    domain.renewal_price = domain.renewal_price.map(cents).transpose()?;
    domain.privacy_cost = domain.privacy_cost.map(cents).transpose()?;
    Ok(domain)
}

impl DomainStore for MemoryRepository {
    fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(lock(&self.users)?.iter().find(|u| u.id == id).cloned())
    }

    fn upsert_user(&self, user: &User) -> Result<User> {
        let mut users = lock(&self.users)?;

        if let Some(email) = &user.email {
            if users
                .iter()
                .any(|u| u.id != user.id && u.email.as_ref() == Some(email))
            {
                return Err(Error::validation(format!(
                    "email {} is already used by another user",
                    email
                )));
            }
        }

        let mut saved = user.clone();
        saved.updated_at = Utc::now();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                saved.created_at = existing.created_at;
                *existing = saved.clone();
            }
            None => users.push(saved.clone()),
        }
        Ok(saved)
    }

    fn get_user_domains(&self, user_id: &str) -> Result<Vec<Domain>> {
        Ok(lock(&self.domains)?
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_domain(&self, id: Uuid, user_id: &str) -> Result<Option<Domain>> {
        Ok(lock(&self.domains)?
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    fn create_domain(&self, new: &NewDomain) -> Result<Domain> {
        let domain = stored_domain(new)?;
        lock(&self.domains)?.push(domain.clone());
        Ok(domain)
    }

    fn create_domains(&self, new: &[NewDomain]) -> Result<Vec<Domain>> {
        let batch = new.iter().map(stored_domain).collect::<Result<Vec<_>>>()?;
        lock(&self.domains)?.extend(batch.iter().cloned());
        Ok(batch)
    }

    fn update_domain(&self, id: Uuid, user_id: &str, update: &DomainUpdate) -> Result<Option<Domain>> {
        let mut domains = lock(&self.domains)?;
        let Some(domain) = domains
            .iter_mut()
            .find(|d| d.id == id && d.user_id == user_id)
        else {
            return Ok(None);
        };
        let mut updated = domain.clone();
        updated.apply(update);
        updated.renewal_price = updated.renewal_price.map(cents).transpose()?;
        updated.privacy_cost = updated.privacy_cost.map(cents).transpose()?;
        *domain = updated.clone();
        Ok(Some(updated))
    }

    fn delete_domain(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let mut domains = lock(&self.domains)?;
        let before = domains.len();
        domains.retain(|d| !(d.id == id && d.user_id == user_id));
        Ok(domains.len() < before)
    }
}

impl PriceTable for MemoryRepository {
    fn get_registrar_prices(&self) -> Result<Vec<RegistrarPrice>> {
        let mut prices = lock(&self.prices)?.clone();
        prices.sort_by(|a, b| a.tld.cmp(&b.tld).then_with(|| a.registrar.cmp(&b.registrar)));
        Ok(prices)
    }

    fn get_prices_for_tld(&self, tld: &str) -> Result<Vec<RegistrarPrice>> {
        Ok(lock(&self.prices)?
            .iter()
            .filter(|p| p.tld == tld)
            .cloned()
            .collect())
    }

    fn upsert_price(&self, price: &NewRegistrarPrice) -> Result<RegistrarPrice> {
        let mut prices = lock(&self.prices)?;
        let now = Utc::now();

        if let Some(existing) = prices
            .iter_mut()
            .find(|p| p.registrar == price.registrar && p.tld == price.tld)
        {
            existing.renewal_price = cents(price.renewal_price)?;
            existing.privacy_price = price.privacy_price.map(cents).transpose()?;
            existing.last_updated = now;
            return Ok(existing.clone());
        }

        let entry = RegistrarPrice {
            id: Uuid::new_v4(),
            registrar: price.registrar.clone(),
            tld: price.tld.clone(),
            renewal_price: cents(price.renewal_price)?,
            privacy_price: price.privacy_price.map(cents).transpose()?,
            last_updated: now,
        };
        prices.push(entry.clone());
        Ok(entry)
    }

    fn delete_price(&self, registrar: &str, tld: &str) -> Result<bool> {
        let mut prices = lock(&self.prices)?;
        let before = prices.len();
        prices.retain(|p| !(p.registrar == registrar && p.tld == tld));
        Ok(prices.len() < before)
    }
}
