//! Concurrent database access tests
//!
//! One DuckDB repository is shared between threads behind an `Arc`, the way
//! the CLI context hands it to every service. Writes serialize on the
//! connection mutex and nothing may be lost.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture
//! Run specific test: cargo test --test concurrent_access_test test_name -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use domfolio_core::adapters::duckdb::DuckDbRepository;
use domfolio_core::ports::{DomainStore, PriceTable};
use domfolio_core::services::PortfolioService;
use domfolio_core::{DomainUpdate, NewDomain, NewRegistrarPrice};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 5;

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("test_concurrent.duckdb");
    let repo = DuckDbRepository::new(&db_path).expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn test_domain(user: &str, name: String, price_cents: i64) -> NewDomain {
    NewDomain {
        user_id: user.to_string(),
        domain_name: name,
        tld: ".com".to_string(),
        registrar: "GoDaddy".to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        renewal_price: Some(Decimal::new(price_cents, 2)),
        privacy_cost: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

/// Threads owned by different users add domains at the same time
#[test]
fn test_concurrent_domain_writes() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            let success_count = Arc::clone(&success_count);
            thread::spawn(move || {
                let user = format!("user-{}", thread_id);
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    let domain = test_domain(&user, format!("site{}-{}", thread_id, i), 1799);
                    if repo.create_domain(&domain).is_ok() {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    println!("{} writes in {:?}", success_count.load(Ordering::SeqCst), start.elapsed());

    assert_eq!(
        success_count.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD
    );
    for thread_id in 0..THREAD_COUNT {
        let domains = repo.get_user_domains(&format!("user-{}", thread_id)).unwrap();
        assert_eq!(domains.len(), ITERATIONS_PER_THREAD);
        // Creation order is kept per user
        for (i, domain) in domains.iter().enumerate() {
            assert_eq!(domain.domain_name, format!("site{}-{}", thread_id, i));
        }
    }
}

/// Price upserts race against readers computing the domain view
#[test]
fn test_concurrent_price_updates_and_reads() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    repo.create_domain(&test_domain("alice", "example".to_string(), 1799))
        .unwrap();

    let service = Arc::new(PortfolioService::new(repo.clone(), repo.clone()));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let read_errors = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let repo = Arc::clone(&repo);
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let read_errors = Arc::clone(&read_errors);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    if thread_id % 2 == 0 {
                        let cents = 1000 + (thread_id * 10 + i) as i64;
                        repo.upsert_price(&NewRegistrarPrice::new(
                            format!("Registrar{}", thread_id),
                            ".com",
                            Decimal::new(cents, 2),
                            None,
                        ))
                        .unwrap();
                    } else if service.compute_user_domain_view("alice").is_err() {
                        read_errors.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(read_errors.load(Ordering::SeqCst), 0);

    // One row per registrar; the last write wins
    let prices = repo.get_prices_for_tld(".com").unwrap();
    assert_eq!(prices.len(), THREAD_COUNT / 2);
    let last = (ITERATIONS_PER_THREAD - 1) as i64;
    for price in &prices {
        let thread_id: i64 = price.registrar.trim_start_matches("Registrar").parse().unwrap();
        assert_eq!(price.renewal_price, Decimal::new(1000 + thread_id * 10 + last, 2));
    }

    let view = service.compute_user_domain_view("alice").unwrap();
    assert_eq!(view[0].best_registrar.as_deref(), Some("Registrar0"));
}

/// Updates and deletes interleave without losing unrelated rows
#[test]
fn test_concurrent_updates_and_deletes() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let ids: Vec<_> = (0..THREAD_COUNT * 2)
        .map(|i| {
            repo.create_domain(&test_domain("alice", format!("site{}", i), 1000))
                .unwrap()
                .id
        })
        .collect();
    let ids = Arc::new(ids);
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let repo = Arc::clone(&repo);
            let ids = Arc::clone(&ids);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let keep = ids[thread_id * 2];
                let removed = ids[thread_id * 2 + 1];
                let update = DomainUpdate {
                    registrar: Some(format!("Registrar{}", thread_id)),
                    ..Default::default()
                };
                assert!(repo.update_domain(keep, "alice", &update).unwrap().is_some());
                assert!(repo.delete_domain(removed, "alice").unwrap());
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let domains = repo.get_user_domains("alice").unwrap();
    assert_eq!(domains.len(), THREAD_COUNT);
    for (thread_id, domain) in domains.iter().enumerate() {
        assert_eq!(domain.domain_name, format!("site{}", thread_id * 2));
        assert_eq!(domain.registrar, format!("Registrar{}", thread_id));
    }
}

/// Open, write, close in a loop; every reopen sees all earlier writes
#[test]
fn test_rapid_open_write_close_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_cycle.duckdb");

    for i in 0..ITERATIONS_PER_THREAD {
        let start = Instant::now();
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.ensure_schema().unwrap();
        repo.create_domain(&test_domain("alice", format!("site{}", i), 1000))
            .unwrap();
        assert_eq!(repo.get_user_domains("alice").unwrap().len(), i + 1);
        println!("Cycle {}: {:?}", i, start.elapsed());
    }
}
