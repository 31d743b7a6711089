//! Domfolio CLI - domain portfolio tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{doctor, domains, import, logs, prices, report, savings, status, user};
use domfolio_core::services::LogEvent;

/// Domfolio - track your domains and find cheaper registrars
#[derive(Parser)]
#[command(name = "domfolio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show portfolio status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the domains in your portfolio
    Domains {
        #[command(subcommand)]
        command: domains::DomainsCommands,
    },

    /// Manage the registrar price table
    Prices {
        #[command(subcommand)]
        command: prices::PricesCommands,
    },

    /// Import domains from CSV
    Import {
        /// Path to CSV file
        file: Option<PathBuf>,
        /// Preview without importing
        #[arg(long)]
        preview: bool,
        /// Use saved import profile
        #[arg(long)]
        profile: Option<String>,
        /// Save settings as profile
        #[arg(long)]
        save_profile: Option<String>,
        /// List saved profiles
        #[arg(long)]
        list_profiles: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Column holding the domain (name or full name)
        #[arg(long)]
        domain_column: Option<String>,
        /// Column holding the TLD
        #[arg(long)]
        tld_column: Option<String>,
        /// Column holding the registrar
        #[arg(long)]
        registrar_column: Option<String>,
        /// Column holding the expiry date
        #[arg(long)]
        expiry_column: Option<String>,
        /// Column holding the renewal price
        #[arg(long)]
        price_column: Option<String>,
        /// Column holding the privacy cost
        #[arg(long)]
        privacy_column: Option<String>,
        /// Registrar for rows without one
        #[arg(long)]
        default_registrar: Option<String>,
        /// Date format tried first (chrono syntax, e.g. %d/%m/%Y)
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Show transfer opportunities and total annual savings
    Savings {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the transfer plan to a CSV or JSON file
    Report {
        /// Output file; a .json extension writes JSON
        path: PathBuf,
        /// Force the output format (csv, json)
        #[arg(long)]
        format: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run portfolio health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the portfolio owner
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Status { .. } => "status",
            Commands::Domains { .. } => "domains",
            Commands::Prices { .. } => "prices",
            Commands::Import { .. } => "import",
            Commands::Savings { .. } => "savings",
            Commands::Report { .. } => "report",
            Commands::Doctor { .. } => "doctor",
            Commands::User { .. } => "user",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The log database is opened per event so commands can open it too
    let command_name = cli.command.name();
    if let Some(logger) = commands::get_logger() {
        let _ = logger.log_command(command_name);
    }

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &commands::get_logger(),
                LogEvent::new("command_failed")
                    .with_command(command_name)
                    .with_error(error_kind(&e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Category of a failure for the event log; messages may carry domain names
fn error_kind(err: &anyhow::Error) -> &'static str {
    use domfolio_core::Error;
    match err.downcast_ref::<Error>() {
        Some(Error::NotFound(_)) => "not_found",
        Some(Error::Validation(_)) => "validation",
        Some(Error::Database(_)) => "database",
        Some(Error::Config(_)) => "config",
        Some(_) => "core",
        None => "other",
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Domains { command } => domains::run(command),
        Commands::Prices { command } => prices::run(command),
        Commands::Import {
            file,
            preview,
            profile,
            save_profile,
            list_profiles,
            json,
            domain_column,
            tld_column,
            registrar_column,
            expiry_column,
            price_column,
            privacy_column,
            default_registrar,
            date_format,
        } => import::run(import::ImportArgs {
            file,
            preview,
            profile,
            save_profile,
            list_profiles,
            json,
            columns: import::ColumnOverrides {
                domain: domain_column,
                tld: tld_column,
                registrar: registrar_column,
                expiry_date: expiry_column,
                renewal_price: price_column,
                privacy_cost: privacy_column,
            },
            default_registrar,
            date_format,
        }),
        Commands::Savings { json } => savings::run(json),
        Commands::Report { path, format, json } => report::run(&path, format.as_deref(), json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::User { command } => user::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
