//! Integration tests for domfolio-core services
//!
//! These run the full stack against a real DuckDB file in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use domfolio_core::adapters::duckdb::DuckDbRepository;
use domfolio_core::config::ColumnMappings;
use domfolio_core::ports::{DomainStore, PriceTable};
use domfolio_core::services::{ImportOptions, PortfolioService, ReportFormat};
use domfolio_core::{DomfolioContext, Error, NewDomain, NewRegistrarPrice};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a test repository with schema initialized
fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("test.duckdb");
    let repo = DuckDbRepository::new(&db_path).expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn new_domain(user: &str, name: &str, tld: &str, registrar: &str, price: Option<Decimal>) -> NewDomain {
    NewDomain {
        user_id: user.to_string(),
        domain_name: name.to_string(),
        tld: tld.to_string(),
        registrar: registrar.to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        renewal_price: price,
        privacy_cost: None,
    }
}

// ============================================================================
// Comparison engine over the real store
// ============================================================================

#[test]
fn test_domain_view_against_sample_prices() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
    let user = ctx.user_id().to_string();

    ctx.pricing_service.load_sample_prices().unwrap();
    ctx.domain_service
        .add(new_domain(&user, "example", ".com", "GoDaddy", Some(dec!(17.99))))
        .unwrap();
    ctx.domain_service
        .add(new_domain(&user, "startup", "io", "Porkbun", Some(dec!(32.44))))
        .unwrap();
    ctx.domain_service
        .add(new_domain(&user, "blog", ".net", "GoDaddy", Some(dec!(20.00))))
        .unwrap();

    let view = ctx.portfolio_service.compute_user_domain_view(&user).unwrap();
    assert_eq!(view.len(), 3);

    // .com: GoDaddy 17.99 vs Cloudflare 9.15
    assert_eq!(view[0].best_price.as_deref(), Some("$9.15"));
    assert_eq!(view[0].best_registrar.as_deref(), Some("Cloudflare"));
    assert_eq!(view[0].savings.as_deref(), Some("$8.84"));

    // .io: already at the cheapest (Porkbun 32.44)
    assert_eq!(view[1].best_registrar.as_deref(), Some("Porkbun"));
    assert_eq!(view[1].savings_amount, Some(Decimal::ZERO));

    // .net: no pricing data
    assert!(view[2].best_price.is_none());
    assert!(view[2].savings_amount.is_none());

    let stats = ctx.portfolio_service.compute_user_stats(&user).unwrap();
    assert_eq!(stats.total_domains, 3);
    assert_eq!(stats.total_savings, dec!(8.84));
    assert_eq!(stats.registrar_count, 2);
    assert_eq!(stats.expiring_soon, 0);
}

#[test]
fn test_exact_decimal_sum_through_storage() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    repo.upsert_price(&NewRegistrarPrice::new("Free", ".com", Decimal::ZERO, None))
        .unwrap();

    for (name, price) in [("a", dec!(9.15)), ("b", dec!(12.98)), ("c", dec!(17.99))] {
        repo.create_domain(&new_domain("alice", name, ".com", "GoDaddy", Some(price)))
            .unwrap();
    }

    let service = PortfolioService::new(repo.clone(), repo.clone());
    let stats = service.compute_user_stats("alice").unwrap();
    assert_eq!(stats.total_savings, dec!(40.12));
}

#[test]
fn test_expiring_soon_boundary_through_storage() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();

    let mut on_boundary = new_domain("alice", "edge", ".com", "GoDaddy", None);
    on_boundary.expiry_date = (now + Duration::days(30)).date_naive();
    let mut past_boundary = new_domain("alice", "later", ".com", "GoDaddy", None);
    past_boundary.expiry_date = (now + Duration::days(31)).date_naive();
    let mut expired = new_domain("alice", "gone", ".com", "GoDaddy", None);
    expired.expiry_date = (now - Duration::days(1)).date_naive();

    for d in [&on_boundary, &past_boundary, &expired] {
        repo.create_domain(d).unwrap();
    }

    let service = PortfolioService::new(repo.clone(), repo.clone());
    let stats = service.compute_user_stats_at("alice", now).unwrap();
    assert_eq!(stats.expiring_soon, 2);
}

#[test]
fn test_tied_prices_pick_one_of_the_cheapest() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    repo.upsert_price(&NewRegistrarPrice::new("First", ".dev", dec!(12.98), None))
        .unwrap();
    repo.upsert_price(&NewRegistrarPrice::new("Second", ".dev", dec!(12.98), None))
        .unwrap();
    repo.create_domain(&new_domain("alice", "site", ".dev", "GoDaddy", Some(dec!(17.99))))
        .unwrap();

    let service = PortfolioService::new(repo.clone(), repo.clone());
    let view = service.compute_user_domain_view("alice").unwrap();
    assert_eq!(view[0].best_price.as_deref(), Some("$12.98"));
    assert_eq!(view[0].savings.as_deref(), Some("$5.01"));
    let chosen = view[0].best_registrar.as_deref().unwrap();
    assert!(["First", "Second"].contains(&chosen), "unexpected registrar {}", chosen);
}

// ============================================================================
// Ownership and persistence
// ============================================================================

#[test]
fn test_other_users_cannot_touch_domains() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();

    let domain = ctx
        .domain_service
        .add(new_domain("alice", "example", ".com", "GoDaddy", None))
        .unwrap();

    let err = ctx.domain_service.remove(domain.id, "mallory").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    assert!(ctx
        .portfolio_service
        .compute_user_domain_view("mallory")
        .unwrap()
        .is_empty());
    assert_eq!(
        ctx.portfolio_service
            .compute_user_domain_view("alice")
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
        ctx.pricing_service.load_sample_prices().unwrap();
        ctx.domain_service
            .add(new_domain("alice", "example", ".com", "GoDaddy", Some(dec!(17.99))))
            .unwrap()
            .id
    };

    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
    let domain = ctx.domain_service.get(id, "alice").unwrap();
    assert_eq!(domain.renewal_price, Some(dec!(17.99)));
    assert_eq!(ctx.pricing_service.list(None).unwrap().len(), 16);

    // Schema migrations are not re-applied
    let result = ctx.repository.run_migrations().unwrap();
    assert!(result.applied.is_empty());
}

// ============================================================================
// Import, report, doctor, status
// ============================================================================

#[test]
fn test_csv_import_then_report() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
    let user = ctx.user_id().to_string();
    ctx.pricing_service.load_sample_prices().unwrap();

    let csv_path = temp_dir.path().join("portfolio.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "Domain,Registrar,Expiration Date,Renewal Price").unwrap();
    writeln!(file, "example.com,GoDaddy,2099-01-15,$17.99").unwrap();
    writeln!(file, "notes.org,Namecheap,2099-03-01,14.98").unwrap();
    writeln!(file, "cheap.com,Cloudflare,2099-05-01,9.15").unwrap();
    drop(file);

    let detected = ctx.import_service.detect_columns(&csv_path).unwrap();
    let mappings: ColumnMappings = detected.to_mappings().unwrap();
    assert_eq!(mappings.expiry_date, "Expiration Date");

    let result = ctx
        .import_service
        .import(&csv_path, &user, &mappings, &ImportOptions::default(), false)
        .unwrap();
    assert_eq!(result.imported, 3);

    let summary = ctx.portfolio_service.savings_summary(&user).unwrap();
    assert_eq!(summary.opportunities.len(), 2);
    assert_eq!(summary.opportunities[0].domain, "example.com");
    assert_eq!(summary.optimal_count, 1);
    // 8.84 (.com) + 4.83 (.org, 14.98 vs 10.15)
    assert_eq!(summary.total_savings, dec!(13.67));

    let report_path = temp_dir.path().join("plan.csv");
    let report = ctx
        .report_service
        .export_transfer_plan(&user, &report_path, None)
        .unwrap();
    assert_eq!(report.format, ReportFormat::Csv);
    assert_eq!(report.rows, 2);
    assert_eq!(
        std::fs::read_to_string(&report_path).unwrap().lines().count(),
        3
    );
}

#[test]
fn test_doctor_and_status() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
    let user = ctx.user_id().to_string();

    ctx.domain_service
        .add(new_domain(&user, "example", ".com", "GoDaddy", None))
        .unwrap();

    let doctor = ctx.doctor_service.run_checks(&user).unwrap();
    assert_eq!(doctor.checks["price_table"].status, "warning");
    assert_eq!(doctor.checks["unknown_renewal_price"].status, "warning");
    assert_eq!(doctor.checks["unpriced_tlds"].status, "warning");

    ctx.pricing_service.load_sample_prices().unwrap();
    let status = ctx.status_service.get_status(&user).unwrap();
    assert_eq!(status.stats.total_domains, 1);
    assert_eq!(status.price_entries, 16);
    assert_eq!(status.priced_tlds.len(), 4);
    assert!(ctx.repository.get_db_size().unwrap() > 0);
}

#[test]
fn test_validation_errors_surface() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();

    let err = ctx
        .pricing_service
        .set(NewRegistrarPrice::new("", ".com", dec!(9.15), None))
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));

    let err = ctx
        .domain_service
        .add(new_domain("alice", "bad name", ".com", "GoDaddy", None))
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
    assert!(ctx.repository.get_user_domains("alice").unwrap().is_empty());
}

#[test]
fn test_amounts_beyond_column_range_are_validation_errors() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();

    let err = ctx
        .domain_service
        .add(new_domain("alice", "huge", ".com", "GoDaddy", Some(dec!(123456789))))
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));

    let err = ctx
        .pricing_service
        .set(NewRegistrarPrice::new("Cloudflare", ".com", dec!(100000000), None))
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));

    // The largest storable amount round-trips exactly
    let domain = ctx
        .domain_service
        .add(new_domain("alice", "max", ".com", "GoDaddy", Some(dec!(99999999.99))))
        .unwrap();
    assert_eq!(domain.renewal_price, Some(dec!(99999999.99)));
}

#[test]
fn test_import_with_oversized_row_keeps_the_rest() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DomfolioContext::new(temp_dir.path()).unwrap();
    let user = ctx.user_id().to_string();

    let csv_path = temp_dir.path().join("portfolio.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "Domain,Registrar,Expiration Date,Renewal Price").unwrap();
    writeln!(file, "first.com,GoDaddy,2099-01-15,17.99").unwrap();
    writeln!(file, "huge.com,GoDaddy,2099-01-15,123456789.00").unwrap();
    writeln!(file, "third.com,GoDaddy,2099-01-15,12.00").unwrap();
    drop(file);

    let mappings = ctx
        .import_service
        .detect_columns(&csv_path)
        .unwrap()
        .to_mappings()
        .unwrap();
    let result = ctx
        .import_service
        .import(&csv_path, &user, &mappings, &ImportOptions::default(), false)
        .unwrap();
    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors[0].line, 3);

    let mut stored: Vec<String> = ctx
        .repository
        .get_user_domains(&user)
        .unwrap()
        .iter()
        .map(|d| d.full_name())
        .collect();
    stored.sort();
    assert_eq!(stored, vec!["first.com", "third.com"]);

    // A re-run finds both as duplicates and writes nothing new
    let again = ctx
        .import_service
        .import(&csv_path, &user, &mappings, &ImportOptions::default(), false)
        .unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.duplicates, 2);
}

#[test]
fn test_failed_batch_insert_leaves_no_rows() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    // Bypasses validation so the failure happens inside DuckDB mid-batch
    let batch = vec![
        new_domain("alice", "first", ".com", "GoDaddy", Some(dec!(17.99))),
        new_domain("alice", "huge", ".com", "GoDaddy", Some(dec!(123456789))),
        new_domain("alice", "third", ".com", "GoDaddy", Some(dec!(12.00))),
    ];
    let err = repo.create_domains(&batch).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert!(repo.get_user_domains("alice").unwrap().is_empty());

    let ok = repo.create_domains(&[batch[0].clone(), batch[2].clone()]).unwrap();
    assert_eq!(ok.len(), 2);
    assert_eq!(repo.get_user_domains("alice").unwrap().len(), 2);
}
