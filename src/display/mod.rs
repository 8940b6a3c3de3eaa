//! Display formatting for terminal output
//!
//! Renders items and history entries as tables and detail views.

pub mod history;
pub mod item;

pub use history::format_history;
pub use item::{format_item_details, format_item_list};
