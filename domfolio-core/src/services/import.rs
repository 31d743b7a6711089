//! Import service - CSV domain portfolio import

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{ColumnMappings, Config, ImportOptions as ConfigImportOptions, ImportProfile};
use crate::domain::money::parse_amount;
use crate::domain::{normalize_tld, split_domain, NewDomain, User};
use crate::ports::DomainStore;

/// Options applied to every row of an import
#[derive(Debug, Default, Clone)]
pub struct ImportOptions {
    /// Registrar for rows whose registrar cell is missing or empty
    pub default_registrar: Option<String>,
    /// chrono format tried before the built-in date formats
    pub date_format: Option<String>,
}

impl ImportOptions {
    pub fn from_profile(profile: &ImportProfile) -> Self {
        Self {
            default_registrar: profile.options.default_registrar.clone(),
            date_format: profile.date_format.clone(),
        }
    }
}

pub struct ImportService {
    store: Arc<dyn DomainStore>,
    app_dir: PathBuf,
}

/// Column indices resolved against the file's header row
struct ColumnIndices {
    domain: usize,
    tld: Option<usize>,
    registrar: Option<usize>,
    expiry_date: usize,
    renewal_price: Option<usize>,
    privacy_cost: Option<usize>,
}

impl ImportService {
    pub fn new(store: Arc<dyn DomainStore>, app_dir: PathBuf) -> Self {
        Self { store, app_dir }
    }

    /// List saved import profiles
    pub fn list_profiles(&self) -> Result<HashMap<String, ImportProfile>> {
        let config = Config::load(&self.app_dir)?;
        Ok(config.import_profiles)
    }

    /// Save an import profile under `name`, replacing any existing one
    pub fn save_profile(
        &self,
        name: &str,
        mappings: &ColumnMappings,
        options: &ImportOptions,
    ) -> Result<()> {
        let mut config = Config::load(&self.app_dir)?;
        config.import_profiles.insert(
            name.to_string(),
            ImportProfile {
                column_mappings: mappings.clone(),
                date_format: options.date_format.clone(),
                options: ConfigImportOptions {
                    default_registrar: options.default_registrar.clone(),
                },
            },
        );
        config.save(&self.app_dir)?;
        Ok(())
    }

    pub fn get_profile(&self, name: &str) -> Result<Option<ImportProfile>> {
        let config = Config::load(&self.app_dir)?;
        Ok(config.import_profiles.get(name).cloned())
    }

    /// Import domains for `user_id` from a CSV file
    ///
    /// Rows that fail to parse or validate are skipped and reported. Domains
    /// already in the portfolio (same lower-cased name and TLD), or repeated
    /// within the file, are counted as duplicates. Accepted rows are written
    /// in one batch: if the store rejects any of them, none are kept. With
    /// `preview_only` nothing is written.
    pub fn import(
        &self,
        file_path: &Path,
        user_id: &str,
        mappings: &ColumnMappings,
        options: &ImportOptions,
        preview_only: bool,
    ) -> Result<ImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(file_path)
            .context("Failed to read CSV file")?;

        let headers = reader.headers()?.clone();
        let columns = resolve_columns(&headers, mappings)?;

        let mut seen: HashSet<(String, String)> = self
            .store
            .get_user_domains(user_id)?
            .iter()
            .map(|d| dedup_key(&d.domain_name, &d.tld))
            .collect();

        let mut result = ImportResult {
            preview: preview_only,
            ..Default::default()
        };
        let mut accepted = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            result.discovered += 1;

            let new = match parse_row(&record, &columns, user_id, options) {
                Ok(new) => new,
                Err(message) => {
                    result.skipped += 1;
                    result.errors.push(RowError { line, message });
                    continue;
                }
            };

            if !seen.insert(dedup_key(&new.domain_name, &new.tld)) {
                result.duplicates += 1;
                continue;
            }
            accepted.push(new);
        }

        if !preview_only && !accepted.is_empty() {
            if self.store.get_user(user_id)?.is_none() {
                self.store.upsert_user(&User::new(user_id))?;
            }
            self.store
                .create_domains(&accepted)
                .context("Failed to save imported domains; nothing was imported")?;
        }

        result.imported = accepted.len();
        if preview_only {
            result.domains = Some(accepted.iter().map(DomainPreview::from).collect());
        }
        Ok(result)
    }

    /// Best-guess column mapping from the CSV header row
    pub fn detect_columns(&self, file_path: &Path) -> Result<DetectedColumns> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(file_path)
            .context("Failed to read CSV file")?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        Ok(detect_from_headers(&headers))
    }
}

fn resolve_columns(headers: &csv::StringRecord, mappings: &ColumnMappings) -> Result<ColumnIndices> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    };
    let find_optional = |name: &Option<String>, label: &str| -> Result<Option<usize>> {
        match name {
            Some(n) => Ok(Some(
                find(n.as_str()).with_context(|| format!("{} column '{}' not found", label, n))?,
            )),
            None => Ok(None),
        }
    };

    Ok(ColumnIndices {
        domain: find(mappings.domain.as_str())
            .with_context(|| format!("Domain column '{}' not found", mappings.domain))?,
        tld: find_optional(&mappings.tld, "TLD")?,
        registrar: find_optional(&mappings.registrar, "Registrar")?,
        expiry_date: find(mappings.expiry_date.as_str())
            .with_context(|| format!("Expiry date column '{}' not found", mappings.expiry_date))?,
        renewal_price: find_optional(&mappings.renewal_price, "Renewal price")?,
        privacy_cost: find_optional(&mappings.privacy_cost, "Privacy cost")?,
    })
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnIndices,
    user_id: &str,
    options: &ImportOptions,
) -> std::result::Result<NewDomain, String> {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let raw_domain = cell(Some(columns.domain)).ok_or("missing domain")?;
    let (domain_name, tld) = match cell(columns.tld) {
        Some(tld) => {
            let tld = normalize_tld(tld);
            let name = strip_suffix_ignore_case(raw_domain, &tld).unwrap_or(raw_domain);
            (name.to_string(), tld)
        }
        None => split_domain(raw_domain)
            .ok_or_else(|| format!("'{}' has no TLD", raw_domain))?,
    };

    let registrar = cell(columns.registrar)
        .map(str::to_string)
        .or_else(|| options.default_registrar.clone())
        .ok_or("missing registrar")?;

    let raw_expiry = cell(Some(columns.expiry_date)).ok_or("missing expiry date")?;
    let expiry_date = parse_date(raw_expiry, options.date_format.as_deref())
        .ok_or_else(|| format!("unrecognised date '{}'", raw_expiry))?;

    let new = NewDomain {
        user_id: user_id.to_string(),
        domain_name,
        tld,
        registrar,
        expiry_date,
        renewal_price: parse_price_cell(cell(columns.renewal_price))?,
        privacy_cost: parse_price_cell(cell(columns.privacy_cost))?,
    };
    new.validate().map_err(|e| e.to_string())?;
    Ok(new)
}

fn parse_price_cell(raw: Option<&str>) -> std::result::Result<Option<Decimal>, String> {
    match raw {
        None => Ok(None),
        Some(s) => parse_amount(s)
            .map(Some)
            .ok_or_else(|| format!("invalid price '{}'", s)),
    }
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(suffix) {
        Some(&name[..split])
    } else {
        None
    }
}

fn dedup_key(name: &str, tld: &str) -> (String, String) {
    (name.to_lowercase(), tld.to_lowercase())
}

fn parse_date(s: &str, preferred: Option<&str>) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%b %d, %Y",
        "%d %b %Y",
    ];

    if let Some(fmt) = preferred {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Timestamps like "2025-06-01T00:00:00Z" keep only the date part
    let s = if s.len() > 10 && s.as_bytes()[10] == b'T' {
        &s[..10]
    } else {
        s
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn detect_from_headers(headers: &[String]) -> DetectedColumns {
    let privacy_patterns: &[&str] = &["privacy", "whois"];
    let expiry_patterns: &[&str] = &["expir", "renewal date", "renew date", "renews", "due date", "paid until"];
    let price_patterns: &[&str] = &["renewal price", "renewal", "price", "cost", "amount"];
    let tld_patterns: &[&str] = &["tld", "extension", "suffix"];
    let registrar_patterns: &[&str] = &["registrar", "provider"];
    let domain_patterns: &[&str] = &["domain", "hostname", "name"];

    let mut used: HashSet<&str> = HashSet::new();
    let mut pick = |patterns: &[&str]| -> Option<String> {
        for pattern in patterns {
            let found = headers.iter().find(|h| {
                !used.contains(h.as_str()) && h.to_lowercase().contains(pattern)
            });
            if let Some(header) = found {
                used.insert(header.as_str());
                return Some(header.clone());
            }
        }
        None
    };

    // Order matters: "Privacy Cost" must not be taken as the renewal price,
    // "Renewal Date" must not be taken as a price.
    let privacy_cost = pick(privacy_patterns);
    let expiry_date = pick(expiry_patterns);
    let renewal_price = pick(price_patterns);
    let tld = pick(tld_patterns);
    let registrar = pick(registrar_patterns);
    let domain = pick(domain_patterns);

    DetectedColumns {
        domain,
        tld,
        registrar,
        expiry_date,
        renewal_price,
        privacy_cost,
    }
}

/// Result of column auto-detection
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DetectedColumns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tld: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_cost: Option<String>,
}

impl DetectedColumns {
    /// Mapping usable for import, if the required columns were found
    pub fn to_mappings(&self) -> Option<ColumnMappings> {
        Some(ColumnMappings {
            domain: self.domain.clone()?,
            tld: self.tld.clone(),
            registrar: self.registrar.clone(),
            expiry_date: self.expiry_date.clone()?,
            renewal_price: self.renewal_price.clone(),
            privacy_cost: self.privacy_cost.clone(),
        })
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ImportResult {
    /// Data rows read from the file
    pub discovered: usize,
    /// Domains imported (or that would be, in preview mode)
    pub imported: usize,
    /// Rows rejected as invalid
    pub skipped: usize,
    /// Rows already in the portfolio or repeated in the file
    pub duplicates: usize,
    /// Whether this was a preview (no changes applied)
    pub preview: bool,
    pub errors: Vec<RowError>,
    /// Domain previews (only in preview mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<DomainPreview>>,
}

#[derive(Debug, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DomainPreview {
    pub domain: String,
    pub registrar: String,
    pub expiry_date: String,
    pub renewal_price: Option<String>,
}

impl From<&NewDomain> for DomainPreview {
    fn from(new: &NewDomain) -> Self {
        Self {
            domain: format!("{}{}", new.domain_name, new.tld),
            registrar: new.registrar.clone(),
            expiry_date: new.expiry_date.to_string(),
            renewal_price: new.renewal_price.map(|p| p.to_string()),
        }
    }
}
