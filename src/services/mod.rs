//! Service layer for StockLedger
//!
//! The service layer puts identity, authorization and validation in front of
//! the storage layer and records every successful mutation in the audit
//! trail.

pub mod access;
pub mod inventory;

pub use access::{authorize, require_identity};
pub use inventory::InventoryService;
