//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod history;
pub mod item;
pub mod token;

pub use history::{handle_history_command, FilterArgs, HistoryCommands};
pub use item::{handle_item_command, ItemCommands};
pub use token::{handle_token_command, TokenCommands};
