//! Domains command - list, show, add, update and remove domains

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::{Confirm, Input};

use domfolio_core::domain::stats::is_expiring_soon;
use domfolio_core::services::parse_domain_input;
use domfolio_core::{DomainUpdate, DomainWithComparison, NewDomain};

use super::{
    display_money, get_context, log_change, parse_date_arg, parse_money_arg,
    parse_optional_money_arg,
};
use crate::output;

#[derive(Subcommand)]
pub enum DomainsCommands {
    /// List domains with the cheapest registrar for each
    List {
        /// Case-insensitive filter on domain name or registrar
        #[arg(long, short)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one domain (by id or full name)
    Show {
        domain: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a domain; missing values are prompted for
    Add {
        /// Full name ("example.com") or name without TLD
        domain: Option<String>,
        /// TLD when the name has none
        #[arg(long)]
        tld: Option<String>,
        #[arg(long)]
        registrar: Option<String>,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,
        /// Current annual renewal price
        #[arg(long)]
        price: Option<String>,
        /// Annual WHOIS privacy cost
        #[arg(long)]
        privacy: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a domain (by id or full name)
    Update {
        domain: String,
        /// New name without TLD
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tld: Option<String>,
        #[arg(long)]
        registrar: Option<String>,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,
        /// Renewal price ("none" clears it)
        #[arg(long)]
        price: Option<String>,
        /// Privacy cost ("none" clears it)
        #[arg(long)]
        privacy: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a domain (by id or full name)
    Remove {
        domain: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: DomainsCommands) -> Result<()> {
    match command {
        DomainsCommands::List { search, json } => run_list(search.as_deref(), json),
        DomainsCommands::Show { domain, json } => run_show(&domain, json),
        DomainsCommands::Add {
            domain,
            tld,
            registrar,
            expiry,
            price,
            privacy,
            json,
        } => run_add(domain, tld, registrar, expiry, price, privacy, json),
        DomainsCommands::Update {
            domain,
            name,
            tld,
            registrar,
            expiry,
            price,
            privacy,
            json,
        } => {
            let update = DomainUpdate {
                domain_name: name,
                tld,
                registrar,
                expiry_date: expiry.as_deref().map(parse_date_arg).transpose()?,
                renewal_price: price.as_deref().map(parse_optional_money_arg).transpose()?,
                privacy_cost: privacy.as_deref().map(parse_optional_money_arg).transpose()?,
            };
            run_update(&domain, update, json)
        }
        DomainsCommands::Remove {
            domain,
            force,
            json,
        } => run_remove(&domain, force, json),
    }
}

fn run_list(search: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let domains = ctx.portfolio_service.search(ctx.user_id(), search)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
        return Ok(());
    }

    if domains.is_empty() {
        println!("No domains found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "Domain",
        "Registrar",
        "Expires",
        "Current",
        "Best",
        "Best Registrar",
        "Savings",
    ]);

    let now = Utc::now();
    for d in &domains {
        table.add_row(vec![
            Cell::new(d.domain.full_name()),
            Cell::new(&d.domain.registrar),
            output::expiry_cell(d.domain.expiry_date, is_expiring_soon(d.domain.expiry_date, now)),
            Cell::new(display_money(d.domain.renewal_price)),
            Cell::new(d.best_price.as_deref().unwrap_or("-")),
            Cell::new(d.best_registrar.as_deref().unwrap_or("-")),
            output::savings_cell(d.savings_amount, d.savings.as_deref()),
        ]);
    }

    println!("{}", table);
    println!("{} domain(s)", domains.len());

    Ok(())
}

fn run_show(reference: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let domain = ctx.domain_service.resolve(ctx.user_id(), reference)?;
    let view = ctx
        .portfolio_service
        .compute_user_domain_view(ctx.user_id())?
        .into_iter()
        .find(|d| d.domain.id == domain.id)
        .unwrap_or_else(|| DomainWithComparison::without_comparison(domain));

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_domain(&view);
    Ok(())
}

fn print_domain(view: &DomainWithComparison) {
    let d = &view.domain;
    println!("{}", d.full_name().bold());
    println!("  ID: {}", d.id);
    println!("  Registrar: {}", d.registrar);
    println!("  Expires: {}", d.expiry_date);
    println!("  Renewal price: {}", display_money(d.renewal_price));
    println!("  Privacy cost: {}", display_money(d.privacy_cost));
    match (&view.best_registrar, &view.best_price) {
        (Some(registrar), Some(price)) => {
            println!("  Cheapest: {} at {}", registrar, price);
            if view.has_savings() {
                println!(
                    "  {}",
                    format!("Save {} per year", view.savings.as_deref().unwrap_or("-")).green()
                );
            }
        }
        _ => println!("  {}", "No pricing data for this TLD".dimmed()),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_add(
    domain: Option<String>,
    tld: Option<String>,
    registrar: Option<String>,
    expiry: Option<String>,
    price: Option<String>,
    privacy: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let input = match domain {
        Some(d) => d,
        None => Input::new().with_prompt("Domain (e.g. example.com)").interact_text()?,
    };
    let fallback_tld = match tld {
        Some(t) => Some(t),
        None if !input.contains('.') => Some(Input::new().with_prompt("TLD").interact_text()?),
        None => None,
    };
    let (domain_name, tld) = parse_domain_input(&input, fallback_tld.as_deref())
        .ok_or_else(|| anyhow::anyhow!("Invalid domain '{}'", input))?;

    let registrar = match registrar {
        Some(r) => r,
        None => Input::new().with_prompt("Registrar").interact_text()?,
    };
    let expiry = match expiry {
        Some(e) => e,
        None => Input::new()
            .with_prompt("Expiry date (YYYY-MM-DD)")
            .interact_text()?,
    };
    let price = match price {
        Some(p) => p,
        None if json => String::new(),
        None => Input::new()
            .with_prompt("Renewal price (blank if unknown)")
            .allow_empty(true)
            .interact_text()?,
    };

    let new = NewDomain {
        user_id: ctx.user_id().to_string(),
        domain_name,
        tld,
        registrar,
        expiry_date: parse_date_arg(&expiry)?,
        renewal_price: parse_optional_money_arg(&price)?,
        privacy_cost: privacy
            .as_deref()
            .map(parse_money_arg)
            .transpose()?,
    };

    let domain = ctx.domain_service.add(new)?;
    log_change("domain_added", "domain", 1);

    if json {
        println!("{}", serde_json::to_string_pretty(&domain)?);
    } else {
        output::success(&format!("Added {}", domain.full_name()));
        println!("  ID: {}", domain.id);
    }

    Ok(())
}

fn run_update(reference: &str, update: DomainUpdate, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let existing = ctx.domain_service.resolve(ctx.user_id(), reference)?;
    let domain = ctx.domain_service.update(existing.id, ctx.user_id(), update)?;
    log_change("domain_updated", "domain", 1);

    if json {
        println!("{}", serde_json::to_string_pretty(&domain)?);
    } else {
        output::success(&format!("Updated {}", domain.full_name()));
    }

    Ok(())
}

fn run_remove(reference: &str, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let domain = ctx.domain_service.resolve(ctx.user_id(), reference)?;

    if !force && !json {
        println!(
            "\n{}",
            format!("This will remove {} from your portfolio.", domain.full_name()).yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.domain_service.remove(domain.id, ctx.user_id())?;
    log_change("domain_removed", "domain", 1);

    if json {
        println!(
            "{}",
            serde_json::json!({ "removed": domain.id, "domain": domain.full_name() })
        );
    } else {
        output::success(&format!("Removed {}", domain.full_name()));
    }

    Ok(())
}
