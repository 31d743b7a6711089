//! Core domain entities
//!
//! All business entities and the pure comparison/aggregation logic live here.
//! No I/O or external dependencies.

pub mod comparison;
pub mod money;
mod price;
mod registration;
pub mod result;
pub mod savings;
pub mod stats;
mod user;

pub use comparison::{compare_domain, select_cheapest, DomainWithComparison};
pub use price::{NewRegistrarPrice, RegistrarPrice};
pub use registration::{normalize_tld, split_domain, validate_tld, Domain, DomainUpdate, NewDomain};
pub use savings::{summarize_savings, SavingsSummary, TransferOpportunity};
pub use stats::{aggregate, PortfolioStats, EXPIRING_SOON_DAYS};
pub use user::User;
