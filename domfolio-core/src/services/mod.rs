//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod doctor;
mod domains;
pub mod import;
pub mod logging;
pub mod migration;
mod portfolio;
mod pricing;
pub mod report;
mod status;
mod user;

pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use domains::{parse_domain_input, DomainService};
pub use import::{DetectedColumns, ImportOptions, ImportResult, ImportService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use portfolio::PortfolioService;
pub use pricing::{PriceImportResult, PricingService};
pub use report::{ReportFormat, ReportResult, ReportService};
pub use status::{RegistrarSummary, StatusService, StatusSummary};
pub use user::{UserService, UserUpdate};
