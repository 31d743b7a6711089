//! Schema for `logs.duckdb`, the privacy-safe event log
//!
//! Kept apart from the portfolio migrations so the log file can be deleted or
//! exported without touching domain data. Applied by `LoggingService` through
//! the same `MigrationService` runner, in the order listed.

/// (file name, SQL) pairs; file names start with a zero-padded sequence number
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
