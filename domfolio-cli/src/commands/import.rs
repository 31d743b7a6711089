//! Import command - import domains from CSV

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use domfolio_core::config::ColumnMappings;
use domfolio_core::services::ImportOptions;

use super::{get_context, log_change};
use crate::output;

/// Column names given on the command line; each overrides the profile or
/// the detected column
#[derive(Default)]
pub struct ColumnOverrides {
    pub domain: Option<String>,
    pub tld: Option<String>,
    pub registrar: Option<String>,
    pub expiry_date: Option<String>,
    pub renewal_price: Option<String>,
    pub privacy_cost: Option<String>,
}

impl ColumnOverrides {
    fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.tld.is_none()
            && self.registrar.is_none()
            && self.expiry_date.is_none()
            && self.renewal_price.is_none()
            && self.privacy_cost.is_none()
    }

    fn apply(self, mappings: &mut ColumnMappings) {
        if let Some(col) = self.domain {
            mappings.domain = col;
        }
        if let Some(col) = self.tld {
            mappings.tld = Some(col);
        }
        if let Some(col) = self.registrar {
            mappings.registrar = Some(col);
        }
        if let Some(col) = self.expiry_date {
            mappings.expiry_date = col;
        }
        if let Some(col) = self.renewal_price {
            mappings.renewal_price = Some(col);
        }
        if let Some(col) = self.privacy_cost {
            mappings.privacy_cost = Some(col);
        }
    }
}

pub struct ImportArgs {
    pub file: Option<PathBuf>,
    pub preview: bool,
    pub profile: Option<String>,
    pub save_profile: Option<String>,
    pub list_profiles: bool,
    pub json: bool,
    pub columns: ColumnOverrides,
    pub default_registrar: Option<String>,
    pub date_format: Option<String>,
}

fn print_mappings(m: &ColumnMappings, indent: &str) {
    println!("{}Domain: {}", indent, m.domain);
    if let Some(ref tld) = m.tld {
        println!("{}TLD: {}", indent, tld);
    }
    if let Some(ref registrar) = m.registrar {
        println!("{}Registrar: {}", indent, registrar);
    }
    println!("{}Expiry: {}", indent, m.expiry_date);
    if let Some(ref price) = m.renewal_price {
        println!("{}Renewal price: {}", indent, price);
    }
    if let Some(ref privacy) = m.privacy_cost {
        println!("{}Privacy cost: {}", indent, privacy);
    }
}

pub fn run(args: ImportArgs) -> Result<()> {
    let ctx = get_context()?;
    let json = args.json;

    if args.list_profiles {
        let profiles = ctx.import_service.list_profiles()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        } else if profiles.is_empty() {
            println!("No saved profiles.");
        } else {
            println!("Saved import profiles:");
            let mut names: Vec<_> = profiles.keys().collect();
            names.sort();
            for name in names {
                let profile = &profiles[name];
                println!();
                println!("  {}", name.green());
                print_mappings(&profile.column_mappings, "    ");
                if let Some(ref fmt) = profile.date_format {
                    println!("    Date format: {}", fmt);
                }
                if let Some(ref registrar) = profile.options.default_registrar {
                    println!("    Default registrar: {}", registrar);
                }
            }
        }
        return Ok(());
    }

    let file_path = args
        .file
        .ok_or_else(|| anyhow::anyhow!("File path required for import"))?;

    // Profile first, then detection, then explicit column flags on top
    let (mut mappings, mut options, using_profile) = if let Some(profile_name) = &args.profile {
        let profile = ctx
            .import_service
            .get_profile(profile_name)?
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_name))?;
        let options = ImportOptions::from_profile(&profile);
        (profile.column_mappings, options, Some(profile_name.clone()))
    } else {
        let detected = ctx.import_service.detect_columns(&file_path)?;
        let mappings = match detected.to_mappings() {
            Some(m) => m,
            None if !args.columns.is_empty() => {
                let mut m = ColumnMappings::default();
                if let Some(domain) = detected.domain {
                    m.domain = domain;
                }
                if let Some(expiry) = detected.expiry_date {
                    m.expiry_date = expiry;
                }
                m.tld = detected.tld;
                m.registrar = detected.registrar;
                m.renewal_price = detected.renewal_price;
                m.privacy_cost = detected.privacy_cost;
                m
            }
            None => anyhow::bail!(
                "Could not detect the domain and expiry date columns; pass --domain-column and --expiry-column"
            ),
        };
        (mappings, ImportOptions::default(), None)
    };

    args.columns.apply(&mut mappings);
    if args.default_registrar.is_some() {
        options.default_registrar = args.default_registrar;
    }
    if args.date_format.is_some() {
        options.date_format = args.date_format;
    }

    if !json {
        match &using_profile {
            Some(name) => output::info(&format!("Using profile '{}'", name)),
            None => output::info("Columns:"),
        }
        print_mappings(&mappings, "  ");
        println!();
    }

    let result = ctx.import_service.import(
        &file_path,
        ctx.user_id(),
        &mappings,
        &options,
        args.preview,
    )?;

    if let Some(profile_name) = args.save_profile {
        ctx.import_service
            .save_profile(&profile_name, &mappings, &options)?;
        if !json {
            println!("Profile '{}' saved", profile_name);
        }
    }

    if !args.preview {
        log_change("domains_imported", "domain", result.imported);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if args.preview {
        output::warning("PREVIEW MODE - No changes applied");
        println!();

        if let Some(domains) = &result.domains {
            let mut table = output::create_table();
            table.set_header(vec!["Domain", "Registrar", "Expires", "Renewal"]);

            for d in domains.iter().take(10) {
                table.add_row(vec![
                    d.domain.as_str(),
                    d.registrar.as_str(),
                    d.expiry_date.as_str(),
                    d.renewal_price.as_deref().unwrap_or("-"),
                ]);
            }
            println!("{}", table);

            if domains.len() > 10 {
                println!("... and {} more", domains.len() - 10);
            }
        }
    } else {
        output::success("Import complete");
    }

    println!();
    println!("  Rows: {}", result.discovered);
    println!("  Imported: {}", result.imported);
    println!("  Duplicates: {}", result.duplicates);
    println!("  Skipped: {}", result.skipped);

    if !result.errors.is_empty() {
        println!();
        for err in result.errors.iter().take(10) {
            output::warning(&format!("  line {}: {}", err.line, err.message));
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more", result.errors.len() - 10);
        }
    }

    Ok(())
}
