//! Audit trail for StockLedger
//!
//! Records every create, update and delete of an item together with the
//! caller who made it and a structural change set, in an append-only trail.
//!
//! # Architecture
//!
//! - `ChangeSet` / `diff`: field-by-field comparison of two optional item
//!   snapshots. A create is `diff(None, Some(item))`, a delete
//!   `diff(Some(item), None)`.
//! - `HistoryEntry`: one immutable record (item, action, actor, role, time,
//!   changes).
//! - `HistoryFilter`: time window, actor, action and whether to include the
//!   change sets in query results.
//! - `AuditTrail`: the in-memory, item-indexed trail, mirrored to a JSONL log.
//!   Only the inventory service appends; everyone else queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockledger::audit::{Action, HistoryFilter};
//!
//! let updates = storage
//!     .history()
//!     .query(item.id, &HistoryFilter::new().action(Action::Update));
//! ```

mod diff;
mod entry;
mod filter;
mod trail;

pub use diff::{diff, diff_fields, ChangeSet, FieldChange};
pub use entry::{Action, HistoryEntry};
pub use filter::HistoryFilter;
pub use trail::AuditTrail;
