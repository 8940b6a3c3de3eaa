//! StockLedger - access-controlled inventory with an audit trail
//!
//! This library keeps a store of inventory items, gates every mutation on the
//! caller's role, and records each successful mutation as an immutable
//! history entry that can be queried and exported as CSV.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (roles, items, ids)
//! - `auth`: Bearer tokens and caller identity
//! - `audit`: Change sets and the append-only audit trail
//! - `storage`: JSON file storage layer and commit gate
//! - `services`: Access-controlled business logic
//! - `export`: CSV export of history
//! - `cli`, `display`, `logging`: Command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use stockledger::auth::Identity;
//! use stockledger::config::LedgerPaths;
//! use stockledger::models::{NewItem, Role};
//! use stockledger::services::InventoryService;
//! use stockledger::storage::Storage;
//!
//! let mut storage = Storage::new(LedgerPaths::new()?)?;
//! storage.load_all()?;
//!
//! let caller = Identity::new("alice", Role::Manager);
//! let service = InventoryService::new(&storage);
//! let item = service.create_item(Some(&caller), NewItem::new("A1", "Bolt", 5))?;
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
