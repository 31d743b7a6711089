//! Prices command - manage the registrar price table

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use domfolio_core::domain::money::format_usd;
use domfolio_core::domain::normalize_tld;
use domfolio_core::NewRegistrarPrice;

use super::{display_money, get_context, log_change, parse_money_arg};
use crate::output;

#[derive(Subcommand)]
pub enum PricesCommands {
    /// List registrar prices, cheapest first within each TLD
    List {
        /// Only show one TLD
        #[arg(long)]
        tld: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the price a registrar charges for a TLD
    Set {
        registrar: Option<String>,
        tld: Option<String>,
        /// Annual renewal price
        #[arg(long)]
        price: Option<String>,
        /// Annual WHOIS privacy price
        #[arg(long)]
        privacy: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a registrar's price for a TLD
    Remove {
        registrar: String,
        tld: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the built-in sample price list
    LoadSample {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import prices from CSV (registrar,tld,renewal_price[,privacy_price])
    Import {
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: PricesCommands) -> Result<()> {
    match command {
        PricesCommands::List { tld, json } => run_list(tld.as_deref(), json),
        PricesCommands::Set {
            registrar,
            tld,
            price,
            privacy,
            json,
        } => run_set(registrar, tld, price, privacy, json),
        PricesCommands::Remove {
            registrar,
            tld,
            force,
            json,
        } => run_remove(&registrar, &tld, force, json),
        PricesCommands::LoadSample { json } => run_load_sample(json),
        PricesCommands::Import { file, json } => run_import(&file, json),
    }
}

fn run_list(tld: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let prices = ctx.pricing_service.list(tld)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prices)?);
        return Ok(());
    }

    if prices.is_empty() {
        println!("No registrar prices found.");
        output::info("Run `domfolio prices load-sample` to load a starter price list.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["TLD", "Registrar", "Renewal", "Privacy", "Updated"]);
    for p in &prices {
        table.add_row(vec![
            p.tld.clone(),
            p.registrar.clone(),
            format_usd(p.renewal_price),
            display_money(p.privacy_price),
            p.last_updated.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{}", table);

    Ok(())
}

fn run_set(
    registrar: Option<String>,
    tld: Option<String>,
    price: Option<String>,
    privacy: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let registrar = match registrar {
        Some(r) => r,
        None => Input::new().with_prompt("Registrar").interact_text()?,
    };
    let tld = match tld {
        Some(t) => t,
        None => Input::new().with_prompt("TLD (e.g. .com)").interact_text()?,
    };
    let price = match price {
        Some(p) => p,
        None => Input::new().with_prompt("Renewal price").interact_text()?,
    };

    let entry = ctx.pricing_service.set(NewRegistrarPrice::new(
        registrar.trim(),
        normalize_tld(&tld),
        parse_money_arg(&price)?,
        privacy.as_deref().map(parse_money_arg).transpose()?,
    ))?;
    log_change("price_set", "price", 1);

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        output::success(&format!(
            "{} {} renews at {}",
            entry.registrar,
            entry.tld,
            format_usd(entry.renewal_price)
        ));
    }

    Ok(())
}

fn run_remove(registrar: &str, tld: &str, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let tld = normalize_tld(tld);

    if !force && !json {
        if !Confirm::new()
            .with_prompt(format!("Remove the {} price for {}?", registrar, tld))
            .default(false)
            .interact()?
        {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.pricing_service.remove(registrar, &tld)?;
    log_change("price_removed", "price", 1);

    if json {
        println!(
            "{}",
            serde_json::json!({ "removed": true, "registrar": registrar, "tld": tld })
        );
    } else {
        output::success(&format!("Removed {} price for {}", registrar, tld));
    }

    Ok(())
}

fn run_load_sample(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let loaded = ctx.pricing_service.load_sample_prices()?;
    log_change("prices_loaded", "price", loaded);

    if json {
        println!("{}", serde_json::json!({ "loaded": loaded }));
    } else {
        output::success(&format!("Loaded {} sample prices", loaded));
    }

    Ok(())
}

fn run_import(file: &std::path::Path, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.pricing_service.import_prices(file)?;
    log_change("prices_imported", "price", result.imported);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success("Price import complete");
    println!("  Imported: {}", result.imported);
    println!("  Skipped: {}", result.skipped);
    for err in result.errors.iter().take(10) {
        output::warning(&format!("  {}", err));
    }
    if result.errors.len() > 10 {
        println!("  ... and {} more", result.errors.len() - 10);
    }

    Ok(())
}
