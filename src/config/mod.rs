//! Configuration module for StockLedger
//!
//! - Base directory resolution
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{NoopUpdatePolicy, Settings};
