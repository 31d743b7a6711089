//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use duckdb::{params, Connection, OptionalExt};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Domain, DomainUpdate, NewDomain, NewRegistrarPrice, RegistrarPrice, User};
use crate::ports::{DomainStore, PriceTable};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Money and dates are read back as text so decimals never pass through f64.
const DOMAIN_COLUMNS: &str = "domain_id, user_id, domain_name, tld, registrar,
    expiry_date::VARCHAR, renewal_price::VARCHAR, privacy_cost::VARCHAR,
    last_checked, created_at, updated_at";

const PRICE_COLUMNS: &str = "price_id, registrar, tld, renewal_price::VARCHAR,
    privacy_price::VARCHAR, last_updated";

const USER_COLUMNS: &str =
    "user_id, email, first_name, last_name, profile_image_url, created_at, updated_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// DuckDB-backed domain store and price table
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbRepository {
    /// Open (or create) the database file
    ///
    /// Retries with exponential backoff when another process holds the file
    /// lock, e.g. two CLI invocations started at the same time.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[domfolio] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!(
                "Failed to open database after {} retries",
                MAX_RETRIES
            ))
        }))
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; the json extension is linked statically
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run pending schema migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Size of the database file in bytes
    pub fn get_db_size(&self) -> Result<u64> {
        let metadata = std::fs::metadata(&self.db_path)?;
        Ok(metadata.len())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn select_domain(conn: &Connection, id: Uuid, user_id: &str) -> Result<Option<Domain>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_domains WHERE domain_id = ? AND user_id = ?",
            DOMAIN_COLUMNS
        ))?;
        let domain = stmt
            .query_row(params![id.to_string(), user_id], |row| {
                Ok(row_to_domain(row))
            })
            .optional()?;
        Ok(domain)
    }

    fn insert_domain(conn: &Connection, domain: &Domain) -> Result<()> {
        conn.execute(
            "INSERT INTO sys_domains (
                domain_id, user_id, domain_name, tld, registrar, expiry_date,
                renewal_price, privacy_cost, last_checked, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, CAST(? AS DATE),
                CAST(? AS DECIMAL(10, 2)), CAST(? AS DECIMAL(10, 2)), ?, ?, ?)",
            params![
                domain.id.to_string(),
                &domain.user_id,
                &domain.domain_name,
                &domain.tld,
                &domain.registrar,
                domain.expiry_date.to_string(),
                domain.renewal_price.map(|p| p.to_string()),
                domain.privacy_cost.map(|p| p.to_string()),
                format_timestamp(&domain.last_checked),
                format_timestamp(&domain.created_at),
                format_timestamp(&domain.updated_at),
            ],
        )?;
        Ok(())
    }

    fn select_price(conn: &Connection, registrar: &str, tld: &str) -> Result<Option<RegistrarPrice>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_registrar_prices WHERE registrar = ? AND tld = ?",
            PRICE_COLUMNS
        ))?;
        let price = stmt
            .query_row(params![registrar, tld], |row| Ok(row_to_price(row)))
            .optional()?;
        Ok(price)
    }
}

impl DomainStore for DuckDbRepository {
    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_users WHERE user_id = ?",
            USER_COLUMNS
        ))?;
        let user = stmt
            .query_row([id], |row| Ok(row_to_user(row)))
            .optional()?;
        Ok(user)
    }

    fn upsert_user(&self, user: &User) -> Result<User> {
        let conn = self.lock()?;

        if let Some(email) = &user.email {
            let taken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sys_users WHERE email = ? AND user_id <> ?",
                params![email, &user.id],
                |row| row.get(0),
            )?;
            if taken > 0 {
                return Err(Error::validation(format!(
                    "email {} is already used by another user",
                    email
                )));
            }
        }

        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_users WHERE user_id = ?",
            [&user.id],
            |row| row.get(0),
        )?;

        let now = Utc::now();
        if exists > 0 {
            conn.execute(
                "UPDATE sys_users
                 SET email = ?, first_name = ?, last_name = ?, profile_image_url = ?,
                     updated_at = ?
                 WHERE user_id = ?",
                params![
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                    &user.profile_image_url,
                    format_timestamp(&now),
                    &user.id,
                ],
            )?;
        } else {
            conn.execute(
                "INSERT INTO sys_users
                    (user_id, email, first_name, last_name, profile_image_url, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    &user.id,
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                    &user.profile_image_url,
                    format_timestamp(&user.created_at),
                    format_timestamp(&now),
                ],
            )?;
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_users WHERE user_id = ?",
            USER_COLUMNS
        ))?;
        Ok(stmt.query_row([&user.id], |row| Ok(row_to_user(row)))?)
    }

    fn get_user_domains(&self, user_id: &str) -> Result<Vec<Domain>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_domains WHERE user_id = ? ORDER BY created_at, rowid",
            DOMAIN_COLUMNS
        ))?;

        let domains = stmt
            .query_map([user_id], |row| Ok(row_to_domain(row)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(domains)
    }

    fn get_domain(&self, id: Uuid, user_id: &str) -> Result<Option<Domain>> {
        let conn = self.lock()?;
        Self::select_domain(&conn, id, user_id)
    }

    fn create_domain(&self, new: &NewDomain) -> Result<Domain> {
        let domain = Domain::from_new(new);
        let conn = self.lock()?;
        Self::insert_domain(&conn, &domain)?;

        // Re-read so the caller sees the stored (DECIMAL(10,2)) values
        Self::select_domain(&conn, domain.id, &domain.user_id)?
            .ok_or_else(|| Error::database("domain vanished after insert"))
    }

    fn create_domains(&self, new: &[NewDomain]) -> Result<Vec<Domain>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let domains: Vec<Domain> = new.iter().map(Domain::from_new).collect();
        for domain in &domains {
            Self::insert_domain(&tx, domain)?;
        }

        let mut stored = Vec::with_capacity(domains.len());
        for domain in &domains {
            stored.push(
                Self::select_domain(&tx, domain.id, &domain.user_id)?
                    .ok_or_else(|| Error::database("domain vanished after insert"))?,
            );
        }
        tx.commit()?;
        Ok(stored)
    }

    fn update_domain(&self, id: Uuid, user_id: &str, update: &DomainUpdate) -> Result<Option<Domain>> {
        let conn = self.lock()?;
        let Some(mut domain) = Self::select_domain(&conn, id, user_id)? else {
            return Ok(None);
        };
        domain.apply(update);

        conn.execute(
            "UPDATE sys_domains
             SET domain_name = ?, tld = ?, registrar = ?, expiry_date = CAST(? AS DATE),
                 renewal_price = CAST(? AS DECIMAL(10, 2)),
                 privacy_cost = CAST(? AS DECIMAL(10, 2)),
                 updated_at = ?
             WHERE domain_id = ? AND user_id = ?",
            params![
                &domain.domain_name,
                &domain.tld,
                &domain.registrar,
                domain.expiry_date.to_string(),
                domain.renewal_price.map(|p| p.to_string()),
                domain.privacy_cost.map(|p| p.to_string()),
                format_timestamp(&domain.updated_at),
                id.to_string(),
                user_id,
            ],
        )?;

        Self::select_domain(&conn, id, user_id)
    }

    fn delete_domain(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_domains WHERE domain_id = ? AND user_id = ?",
            params![id.to_string(), user_id],
        )?;
        Ok(deleted > 0)
    }
}

impl PriceTable for DuckDbRepository {
    fn get_registrar_prices(&self) -> Result<Vec<RegistrarPrice>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_registrar_prices ORDER BY tld, registrar",
            PRICE_COLUMNS
        ))?;

        let prices = stmt
            .query_map([], |row| Ok(row_to_price(row)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(prices)
    }

    fn get_prices_for_tld(&self, tld: &str) -> Result<Vec<RegistrarPrice>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_registrar_prices WHERE tld = ? ORDER BY rowid",
            PRICE_COLUMNS
        ))?;

        let prices = stmt
            .query_map([tld], |row| Ok(row_to_price(row)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(prices)
    }

    fn upsert_price(&self, price: &NewRegistrarPrice) -> Result<RegistrarPrice> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO sys_registrar_prices
                (price_id, registrar, tld, renewal_price, privacy_price, last_updated)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(10, 2)), CAST(? AS DECIMAL(10, 2)), ?)
             ON CONFLICT (registrar, tld) DO UPDATE SET
                renewal_price = excluded.renewal_price,
                privacy_price = excluded.privacy_price,
                last_updated = excluded.last_updated",
            params![
                Uuid::new_v4().to_string(),
                &price.registrar,
                &price.tld,
                price.renewal_price.to_string(),
                price.privacy_price.map(|p| p.to_string()),
                format_timestamp(&Utc::now()),
            ],
        )?;

        Self::select_price(&conn, &price.registrar, &price.tld)?
            .ok_or_else(|| Error::database("price vanished after upsert"))
    }

    fn delete_price(&self, registrar: &str, tld: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_registrar_prices WHERE registrar = ? AND tld = ?",
            params![registrar, tld],
        )?;
        Ok(deleted > 0)
    }
}

// Row mappers

fn row_to_domain(row: &duckdb::Row) -> Domain {
    // Column order follows DOMAIN_COLUMNS
    let id_str: String = row.get(0).unwrap_or_default();
    let expiry_str: String = row.get(5).unwrap_or_default();
    let last_checked: String = row.get(8).unwrap_or_default();
    let created_str: String = row.get(9).unwrap_or_default();
    let updated_str: String = row.get(10).unwrap_or_default();

    Domain {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        user_id: row.get(1).unwrap_or_default(),
        domain_name: row.get(2).unwrap_or_default(),
        tld: row.get(3).unwrap_or_default(),
        registrar: row.get(4).unwrap_or_default(),
        expiry_date: parse_date(&expiry_str),
        renewal_price: parse_money(row.get::<_, Option<String>>(6).ok().flatten()),
        privacy_cost: parse_money(row.get::<_, Option<String>>(7).ok().flatten()),
        last_checked: parse_timestamp(&last_checked),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    }
}

fn row_to_price(row: &duckdb::Row) -> RegistrarPrice {
    let id_str: String = row.get(0).unwrap_or_default();
    let updated_str: String = row.get(5).unwrap_or_default();

    RegistrarPrice {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        registrar: row.get(1).unwrap_or_default(),
        tld: row.get(2).unwrap_or_default(),
        renewal_price: parse_money(row.get::<_, Option<String>>(3).ok().flatten())
            .unwrap_or_default(),
        privacy_price: parse_money(row.get::<_, Option<String>>(4).ok().flatten()),
        last_updated: parse_timestamp(&updated_str),
    }
}

fn row_to_user(row: &duckdb::Row) -> User {
    let created_str: String = row.get(5).unwrap_or_default();
    let updated_str: String = row.get(6).unwrap_or_default();

    User {
        id: row.get(0).unwrap_or_default(),
        email: row.get::<_, Option<String>>(1).ok().flatten(),
        first_name: row.get::<_, Option<String>>(2).ok().flatten(),
        last_name: row.get::<_, Option<String>>(3).ok().flatten(),
        profile_image_url: row.get::<_, Option<String>>(4).ok().flatten(),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    }
}

// Helper functions

/// Fixed-width RFC 3339 so stored timestamps sort chronologically as text
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_money(s: Option<String>) -> Option<Decimal> {
    s.and_then(|v| Decimal::from_str_exact(v.trim()).ok())
}
