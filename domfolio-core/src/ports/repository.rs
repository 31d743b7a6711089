//! Storage ports - the persistence capabilities the services depend on

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Domain, DomainUpdate, NewDomain, NewRegistrarPrice, RegistrarPrice, User};

/// Domain and user storage
///
/// Every domain operation is scoped by the owning user id: a domain owned by
/// another user behaves as if it did not exist.
pub trait DomainStore: Send + Sync {
    // === Users ===

    /// Get a user by ID
    fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Insert or update a user, keyed by ID
    fn upsert_user(&self, user: &User) -> Result<User>;

    // === Domains ===

    /// All domains owned by a user, in creation order
    fn get_user_domains(&self, user_id: &str) -> Result<Vec<Domain>>;

    /// A single domain, if it exists and belongs to the user
    fn get_domain(&self, id: Uuid, user_id: &str) -> Result<Option<Domain>>;

    /// Insert a new domain, assigning its ID and timestamps
    fn create_domain(&self, domain: &NewDomain) -> Result<Domain>;

    /// Insert several domains at once; on error none of them are stored
    fn create_domains(&self, domains: &[NewDomain]) -> Result<Vec<Domain>>;

    /// Apply a partial update; None when the domain is not the user's
    fn update_domain(&self, id: Uuid, user_id: &str, update: &DomainUpdate) -> Result<Option<Domain>>;

    /// Delete a domain; false when nothing matched
    fn delete_domain(&self, id: Uuid, user_id: &str) -> Result<bool>;
}

/// Registrar price table
pub trait PriceTable: Send + Sync {
    /// All price entries
    fn get_registrar_prices(&self) -> Result<Vec<RegistrarPrice>>;

    /// Entries whose TLD exactly equals `tld` (case-sensitive)
    fn get_prices_for_tld(&self, tld: &str) -> Result<Vec<RegistrarPrice>>;

    /// Insert or replace the entry for (registrar, tld), refreshing last_updated
    fn upsert_price(&self, price: &NewRegistrarPrice) -> Result<RegistrarPrice>;

    /// Delete the entry for (registrar, tld); false when nothing matched
    fn delete_price(&self, registrar: &str, tld: &str) -> Result<bool>;
}
