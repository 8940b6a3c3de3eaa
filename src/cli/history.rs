//! History CLI commands
//!
//! Shows and exports the audit trail of one item.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::audit::{Action, HistoryFilter};
use crate::auth::Identity;
use crate::display::history::format_history;
use crate::error::{LedgerError, LedgerResult};
use crate::models::ItemId;
use crate::services::InventoryService;
use crate::storage::Storage;

/// Filter options shared by history subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only entries at or after this time (RFC 3339)
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,
    /// Only entries at or before this time (RFC 3339)
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,
    /// Only entries made by this user
    #[arg(long)]
    pub actor: Option<String>,
    /// Only entries of this action (create, update, delete)
    #[arg(long)]
    pub action: Option<Action>,
    /// Leave field changes out of the result
    #[arg(long)]
    pub no_changes: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> HistoryFilter {
        HistoryFilter {
            from: self.from,
            to: self.to,
            actor: self.actor.clone(),
            action: self.action,
            include_changes: !self.no_changes,
        }
    }
}

/// History subcommands
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Show the history of an item
    Show {
        /// Item ID (deleted items keep their history)
        id: ItemId,
        /// One entry per line instead of a table
        #[arg(long)]
        plain: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export the history of an item as CSV
    Export {
        /// Item ID (deleted items keep their history)
        id: ItemId,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Handle a history command
pub fn handle_history_command(
    storage: &Storage,
    caller: Option<&Identity>,
    cmd: HistoryCommands,
) -> LedgerResult<()> {
    let service = InventoryService::new(storage);

    match cmd {
        HistoryCommands::Show { id, plain, filter } => {
            let entries = service.get_history(caller, id, &filter.to_filter())?;
            if plain {
                for entry in &entries {
                    println!("{}", entry.format_human_readable());
                }
            } else {
                print!("{}", format_history(&entries));
            }
        }

        HistoryCommands::Export { id, output, filter } => {
            let csv = service.export_history_csv(caller, id, &filter.to_filter())?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &csv).map_err(|e| {
                        LedgerError::Export(format!("Failed to write {}: {}", path.display(), e))
                    })?;
                    println!("Exported history of item {} to {}", id, path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&csv)?;
                    stdout.flush()?;
                }
            }
        }
    }

    Ok(())
}
