//! Configuration management
//!
//! settings.json layout:
//! ```json
//! {
//!   "app": { "userId": "local", ... },
//!   "importProfiles": { "profiles": { ... } }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;

/// User id used when nothing is configured
pub const DEFAULT_USER_ID: &str = "local";

/// Environment variable overriding the configured user id
pub const USER_ENV_VAR: &str = "DOMFOLIO_USER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    import_profiles: ImportProfilesContainer,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportProfilesContainer {
    #[serde(default)]
    profiles: HashMap<String, ImportProfile>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Domfolio configuration (simplified view of settings.json)
#[derive(Debug, Clone)]
pub struct Config {
    /// Owner of the portfolio the CLI operates on
    pub user_id: String,
    pub import_profiles: HashMap<String, ImportProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            import_profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from the application directory
    ///
    /// A malformed settings file falls back to defaults. `DOMFOLIO_USER`
    /// overrides the stored user id.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let raw = read_settings(app_dir)?;

        let user_id = std::env::var(USER_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or(raw.app.user_id)
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        Ok(Self {
            user_id,
            import_profiles: raw.import_profiles.profiles,
        })
    }

    /// Save config, preserving settings this crate doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let mut settings = read_settings(app_dir)?;

        settings.app.user_id = Some(self.user_id.clone());
        settings.import_profiles.profiles = self.import_profiles.clone();

        std::fs::create_dir_all(app_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(app_dir.join("settings.json"), content)?;
        Ok(())
    }

    /// Switch the configured user
    pub fn set_user_id(&mut self, user_id: &str) -> crate::domain::result::Result<()> {
        let trimmed = user_id.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!("invalid user id '{}'", user_id)));
        }
        self.user_id = trimmed.to_string();
        Ok(())
    }
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

/// Saved column mapping and options for a recurring CSV source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfile {
    pub column_mappings: ColumnMappings,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub options: ImportOptions,
}

/// Import options stored with a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Registrar used when a row has none
    #[serde(default)]
    pub default_registrar: Option<String>,
}

/// CSV header names for each domain field
///
/// `domain` may hold a bare label ("example") or a full name ("example.com");
/// the latter is split when `tld` is not mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMappings {
    pub domain: String,
    #[serde(default)]
    pub tld: Option<String>,
    #[serde(default)]
    pub registrar: Option<String>,
    pub expiry_date: String,
    #[serde(default)]
    pub renewal_price: Option<String>,
    #[serde(default)]
    pub privacy_cost: Option<String>,
}

impl Default for ColumnMappings {
    fn default() -> Self {
        Self {
            domain: "Domain".to_string(),
            tld: None,
            registrar: Some("Registrar".to_string()),
            expiry_date: "Expiry Date".to_string(),
            renewal_price: Some("Renewal Price".to_string()),
            privacy_cost: None,
        }
    }
}
