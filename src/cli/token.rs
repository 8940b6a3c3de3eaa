//! Token CLI commands

use chrono::Duration;
use clap::Subcommand;

use crate::auth::TokenAuthority;
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Role;

/// Token subcommands
#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue a bearer token
    Issue {
        /// Username the token identifies
        username: String,
        /// Role granted by the token (viewer, manager, admin)
        #[arg(short, long, default_value = "viewer")]
        role: String,
        /// Lifetime in hours (defaults to the configured token_ttl_hours)
        #[arg(long)]
        ttl_hours: Option<u32>,
    },
}

/// Handle a token command
pub fn handle_token_command(
    authority: &TokenAuthority,
    settings: &Settings,
    cmd: TokenCommands,
) -> LedgerResult<()> {
    match cmd {
        TokenCommands::Issue {
            username,
            role,
            ttl_hours,
        } => {
            let role = Role::parse(&role).ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "Invalid role: '{}'. Valid roles: viewer, manager, admin",
                    role
                ))
            })?;
            let ttl = match ttl_hours {
                Some(hours) => Duration::hours(i64::from(hours)),
                None => settings.token_ttl(),
            };

            let token = authority.issue(&username, role, ttl)?;
            tracing::info!(user = %username.trim(), role = %role, "token issued");
            println!("{}", token);
        }
    }

    Ok(())
}
