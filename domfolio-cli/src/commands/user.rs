//! User command - the portfolio owner's profile

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use domfolio_core::config::{Config, USER_ENV_VAR};
use domfolio_core::services::{LogEvent, UserUpdate};
use domfolio_core::User;

use super::{get_app_dir, get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Show the current user
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields (an empty value clears a field)
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        profile_image_url: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Make another user id the configured portfolio owner
    Switch {
        user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Show { json } => {
            let ctx = get_context()?;
            let user = ctx.user_service.current(ctx.user_id())?;
            print_user(&user, json)
        }
        UserCommands::Update {
            email,
            first_name,
            last_name,
            profile_image_url,
            json,
        } => {
            let update = UserUpdate {
                email,
                first_name,
                last_name,
                profile_image_url,
            };
            if update.email.is_none()
                && update.first_name.is_none()
                && update.last_name.is_none()
                && update.profile_image_url.is_none()
            {
                anyhow::bail!("Nothing to update; pass at least one field");
            }

            let ctx = get_context()?;
            let user = ctx.user_service.update(ctx.user_id(), update)?;
            log_event(&get_logger(), LogEvent::new("user_updated").with_subject("user"));
            if !json {
                output::success("Profile updated");
            }
            print_user(&user, json)
        }
        UserCommands::Switch { user_id, json } => {
            let app_dir = get_app_dir()?;
            let mut config = Config::load(&app_dir)?;
            config.set_user_id(&user_id)?;
            config.save(&app_dir)?;
            log_event(&get_logger(), LogEvent::new("user_switched").with_subject("user"));

            if json {
                println!("{}", serde_json::json!({ "user_id": config.user_id }));
            } else {
                output::success(&format!("Now using portfolio of '{}'", config.user_id));
                if std::env::var(USER_ENV_VAR).is_ok() {
                    output::warning(&format!(
                        "{} is set and overrides this setting",
                        USER_ENV_VAR
                    ));
                }
            }
            Ok(())
        }
    }
}

fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
        return Ok(());
    }

    println!("{}", user.display_name().bold());
    println!("  ID: {}", user.id);
    println!("  Email: {}", user.email.as_deref().unwrap_or("-"));
    println!("  First name: {}", user.first_name.as_deref().unwrap_or("-"));
    println!("  Last name: {}", user.last_name.as_deref().unwrap_or("-"));
    if let Some(url) = &user.profile_image_url {
        println!("  Profile image: {}", url);
    }
    println!("  Created: {}", user.created_at.format("%Y-%m-%d"));

    Ok(())
}
