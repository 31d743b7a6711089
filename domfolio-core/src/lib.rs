//! Domfolio Core - domain portfolio tracking and registrar price comparison
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities and the pure comparison/aggregation engine
//! - **ports**: Trait definitions for storage (DomainStore, PriceTable)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory, sample prices)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::{DomainStore, PriceTable};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    Domain, DomainUpdate, DomainWithComparison, NewDomain, NewRegistrarPrice, PortfolioStats,
    RegistrarPrice, SavingsSummary, User,
};

/// Database file inside the application directory
pub const DB_FILENAME: &str = "domfolio.duckdb";

/// Main context for Domfolio operations
///
/// Holds the database, configuration, and all services. Services share one
/// DuckDB repository through the port traits.
pub struct DomfolioContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub portfolio_service: Arc<PortfolioService>,
    pub domain_service: DomainService,
    pub pricing_service: PricingService,
    pub import_service: ImportService,
    pub report_service: ReportService,
    pub doctor_service: DoctorService,
    pub status_service: StatusService,
    pub user_service: UserService,
}

impl DomfolioContext {
    /// Open the portfolio in `app_dir`, creating the database and schema on
    /// first use
    pub fn new(app_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;
        let config = Config::load(app_dir)?;

        let repository = Arc::new(DuckDbRepository::new(&app_dir.join(DB_FILENAME))?);
        repository.ensure_schema()?;

        let domains: Arc<dyn DomainStore> = repository.clone();
        let prices: Arc<dyn PriceTable> = repository.clone();

        let portfolio_service = Arc::new(PortfolioService::new(
            Arc::clone(&domains),
            Arc::clone(&prices),
        ));
        let domain_service = DomainService::new(Arc::clone(&domains));
        let pricing_service = PricingService::new(Arc::clone(&prices));
        let import_service = ImportService::new(Arc::clone(&domains), app_dir.to_path_buf());
        let report_service = ReportService::new(Arc::clone(&portfolio_service));
        let doctor_service = DoctorService::new(Arc::clone(&domains), Arc::clone(&prices));
        let status_service = StatusService::new(Arc::clone(&portfolio_service), Arc::clone(&prices));
        let user_service = UserService::new(domains);

        Ok(Self {
            config,
            repository,
            portfolio_service,
            domain_service,
            pricing_service,
            import_service,
            report_service,
            doctor_service,
            status_service,
            user_service,
        })
    }

    /// The configured portfolio owner
    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }
}
