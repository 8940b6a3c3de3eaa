//! Item CLI commands
//!
//! Implements CLI commands for item management.

use clap::Subcommand;

use crate::auth::Identity;
use crate::config::Settings;
use crate::display::item::{format_item_details, format_item_list};
use crate::error::LedgerResult;
use crate::models::{ItemId, ItemPatch, NewItem};
use crate::services::InventoryService;
use crate::storage::Storage;

/// Item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// List items
    List {
        /// Only show items whose sku, name or location contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show item details
    Show {
        /// Item ID
        id: ItemId,
    },
    /// Create a new item
    Create {
        /// Stock-keeping unit, unique across live items
        sku: String,
        /// Item name
        name: String,
        /// Quantity on hand
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        qty: i64,
        /// Storage location
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Update an item
    Update {
        /// Item ID
        id: ItemId,
        /// New sku
        #[arg(long)]
        sku: Option<String>,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New quantity
        #[arg(short, long, allow_negative_numbers = true)]
        qty: Option<i64>,
        /// New location (an empty value clears it)
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Delete an item (admin only)
    Delete {
        /// Item ID
        id: ItemId,
    },
}

/// Handle an item command
pub fn handle_item_command(
    storage: &Storage,
    settings: &Settings,
    caller: Option<&Identity>,
    cmd: ItemCommands,
) -> LedgerResult<()> {
    let service = InventoryService::new(storage).with_noop_policy(settings.noop_updates);

    match cmd {
        ItemCommands::List { search } => {
            let items = service.list_items(caller, search.as_deref())?;
            print!("{}", format_item_list(&items));
        }

        ItemCommands::Show { id } => {
            let item = service.get_item(caller, id)?;
            print!("{}", format_item_details(&item));
        }

        ItemCommands::Create {
            sku,
            name,
            qty,
            location,
        } => {
            let new = NewItem {
                sku,
                name,
                qty,
                location,
            };
            let item = service.create_item(caller, new)?;

            println!("Created item: {}", item);
            println!("  ID: {}", item.id);
            println!("  Quantity: {}", item.qty);
            if let Some(location) = &item.location {
                println!("  Location: {}", location);
            }
        }

        ItemCommands::Update {
            id,
            sku,
            name,
            qty,
            location,
        } => {
            let patch = ItemPatch {
                sku,
                name,
                qty,
                location,
            };

            if patch.is_empty() {
                println!("No changes specified. Use --sku, --name, --qty or --location.");
                return Ok(());
            }

            let item = service.update_item(caller, id, patch)?;
            println!("Updated item: {}", item);
        }

        ItemCommands::Delete { id } => {
            service.delete_item(caller, id)?;
            println!("Deleted item {}", id);
        }
    }

    Ok(())
}
