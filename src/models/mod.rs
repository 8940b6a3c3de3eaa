//! Core data models for StockLedger
//!
//! Items, the role hierarchy, and the typed ids shared by the store and the
//! audit trail.

pub mod ids;
pub mod item;
pub mod role;

pub use ids::{EntryId, ItemId};
pub use item::{Item, ItemPatch, ItemValidationError, NewItem};
pub use role::Role;
