//! Storage layer for StockLedger
//!
//! Provides JSON file storage for items, the JSONL-backed audit trail, and
//! the commit gate that makes a mutation and its history entry visible to
//! readers together.
//!
//! The trail is the durable record of every mutation; items.json is a
//! snapshot. On load the snapshot is checked against the trail and repaired
//! if a save was lost.

pub mod file_io;
pub mod items;

pub use file_io::{read_snapshot, write_snapshot};
pub use items::ItemRepository;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::audit::{Action, AuditTrail, HistoryEntry, HistoryFilter};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Item, ItemId};

/// Main storage coordinator
pub struct Storage {
    paths: LedgerPaths,
    pub(crate) items: ItemRepository,
    pub(crate) history: AuditTrail,
    /// Held exclusively by mutations across apply + record, shared by reads
    gate: RwLock<()>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            items: ItemRepository::new(paths.items_file()),
            history: AuditTrail::new(paths.history_file()),
            gate: RwLock::new(()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Live items, read-only
    pub fn items(&self) -> &ItemRepository {
        &self.items
    }

    /// The audit trail, read-only
    pub fn history(&self) -> &AuditTrail {
        &self.history
    }

    /// Load all data from disk
    ///
    /// Ids already used in the trail are never handed out again, and items
    /// whose snapshot disagrees with the trail are rebuilt from it.
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.items.load()?;
        self.history.load()?;

        if let Some(highest) = self.history.highest_item_id() {
            self.items.reserve_ids_through(highest)?;
        }
        self.reconcile_items()
    }

    fn reconcile_items(&self) -> LedgerResult<()> {
        let mut repaired = 0usize;

        for id in self.history.item_ids() {
            let entries = self.history.query(id, &HistoryFilter::default());
            let expected = match replay(id, &entries) {
                Ok(expected) => expected,
                Err(e) => {
                    tracing::error!(item_id = %id, error = %e, "history cannot be replayed, snapshot kept");
                    continue;
                }
            };
            let current = self.items.get(id).ok();

            match (current, expected) {
                (Some(current), Some(expected)) => {
                    if current.tracked_fields() != expected.tracked_fields() {
                        self.items.restore(Item {
                            created_at: current.created_at,
                            ..expected
                        })?;
                        repaired += 1;
                    }
                }
                (None, Some(expected)) => {
                    self.items.restore(expected)?;
                    repaired += 1;
                }
                (Some(_), None) => {
                    self.items.remove(id)?;
                    repaired += 1;
                }
                (None, None) => {}
            }
        }

        if repaired > 0 {
            tracing::warn!(repaired, "items.json was behind the audit trail, rebuilt from history");
            if let Err(e) = self.items.save() {
                tracing::error!(error = %e, "repaired items not written to items.json");
            }
        }
        Ok(())
    }

    /// Exclusive access for one mutation
    pub(crate) fn write_gate(&self) -> Result<RwLockWriteGuard<'_, ()>, LedgerError> {
        self.gate
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire commit gate: {}", e)))
    }

    /// Shared access for a consistent read
    pub(crate) fn read_gate(&self) -> Result<RwLockReadGuard<'_, ()>, LedgerError> {
        self.gate
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire commit gate: {}", e)))
    }
}

/// The item state implied by one item's history, `None` once deleted
fn replay(id: ItemId, entries: &[HistoryEntry]) -> LedgerResult<Option<Item>> {
    let mut fields: Option<Map<String, Value>> = None;
    let mut created_at = DateTime::<Utc>::default();
    let mut updated_at = DateTime::<Utc>::default();

    for entry in entries {
        match entry.action {
            Action::Create => {
                fields = Some(Map::new());
                created_at = entry.changed_at;
                updated_at = entry.changed_at;
            }
            Action::Delete => {
                fields = None;
                continue;
            }
            Action::Update => {}
        }

        let (Some(fields), Some(changes)) = (fields.as_mut(), entry.changes.as_ref()) else {
            continue;
        };
        if entry.action == Action::Update && !changes.is_empty() {
            updated_at = entry.changed_at;
        }
        for (field, change) in changes.iter() {
            if change.to.is_null() {
                fields.remove(field);
            } else {
                fields.insert(field.to_string(), change.to.clone());
            }
        }
    }

    let Some(mut fields) = fields else {
        return Ok(None);
    };
    fields.insert("id".into(), Value::from(id.get()));
    fields.insert("created_at".into(), serde_json::to_value(created_at)?);
    fields.insert("updated_at".into(), serde_json::to_value(updated_at)?);

    serde_json::from_value(Value::Object(fields)).map(Some).map_err(|e| {
        LedgerError::Storage(format!("Cannot rebuild item {} from history: {}", id, e))
    })
}
