//! Export module for StockLedger
//!
//! - CSV: history entries (spreadsheet-compatible)

pub mod csv;

pub use self::csv::{history_to_csv, write_history_csv, HistoryCsvRow, HISTORY_CSV_HEADER};
