//! Inventory service
//!
//! Access-controlled item mutations. Each request runs
//! authenticate, authorize, validate, apply, record, in that order. The apply
//! and record steps happen under the storage commit gate, so a reader sees
//! either both the item change and its history entry or neither.
//!
//! A mutation is committed once its history entry is durable. If that append
//! fails the item change is rolled back and the caller gets the error.

use crate::audit::{diff, Action, ChangeSet, HistoryEntry, HistoryFilter};
use crate::auth::Identity;
use crate::config::NoopUpdatePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::export::history_to_csv;
use crate::models::{Item, ItemId, ItemPatch, NewItem};
use crate::storage::Storage;

use super::access::{authorize, require_identity};

/// Service for item management
pub struct InventoryService<'a> {
    storage: &'a Storage,
    noop: NoopUpdatePolicy,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service with the default no-op policy
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            noop: NoopUpdatePolicy::default(),
        }
    }

    pub fn with_noop_policy(mut self, policy: NoopUpdatePolicy) -> Self {
        self.noop = policy;
        self
    }

    /// List live items, optionally filtered by a search term
    pub fn list_items(
        &self,
        caller: Option<&Identity>,
        search: Option<&str>,
    ) -> LedgerResult<Vec<Item>> {
        require_identity(caller)?;
        let _gate = self.storage.read_gate()?;
        self.storage.items.list(search)
    }

    /// Get one live item
    pub fn get_item(&self, caller: Option<&Identity>, id: ItemId) -> LedgerResult<Item> {
        require_identity(caller)?;
        let _gate = self.storage.read_gate()?;
        self.storage.items.get(id)
    }

    /// Create an item and record a `create` entry
    pub fn create_item(&self, caller: Option<&Identity>, new: NewItem) -> LedgerResult<Item> {
        let identity = require_identity(caller)?;
        authorize(identity, Action::Create)?;
        let new = new
            .normalized()
            .map_err(|e| LedgerError::InvalidInput(e.to_string()))?;

        let _gate = self.storage.write_gate()?;

        let item = self.storage.items.insert(new)?;
        let changes = diff(None, Some(&item));

        if let Err(e) = self.record(identity, item.id, Action::Create, changes) {
            self.undo(item.id, self.storage.items.remove(item.id).map(drop));
            return Err(e);
        }
        self.persist_items();

        tracing::info!(
            item_id = %item.id,
            sku = %item.sku,
            actor = %identity.username,
            "item created"
        );
        Ok(item)
    }

    /// Apply a partial update and record an `update` entry
    ///
    /// An update that changes nothing follows the configured no-op policy.
    pub fn update_item(
        &self,
        caller: Option<&Identity>,
        id: ItemId,
        patch: ItemPatch,
    ) -> LedgerResult<Item> {
        let identity = require_identity(caller)?;
        authorize(identity, Action::Update)?;
        let patch = patch
            .normalized()
            .map_err(|e| LedgerError::InvalidInput(e.to_string()))?;

        let _gate = self.storage.write_gate()?;

        let current = self.storage.items.get(id)?;
        let changes = diff(Some(&current), Some(&patch.apply_to(&current)));

        if changes.is_empty() {
            if self.noop == NoopUpdatePolicy::Skip {
                tracing::debug!(item_id = %id, "update changes nothing, skipped");
                return Ok(current);
            }
            self.record(identity, id, Action::Update, changes)?;
            return Ok(current);
        }

        let updated = self.storage.items.replace(id, &patch)?;

        if let Err(e) = self.record(identity, id, Action::Update, changes) {
            self.undo(id, self.storage.items.restore(current));
            return Err(e);
        }
        self.persist_items();

        tracing::info!(item_id = %id, actor = %identity.username, "item updated");
        Ok(updated)
    }

    /// Delete an item and record a `delete` entry with its last snapshot
    pub fn delete_item(&self, caller: Option<&Identity>, id: ItemId) -> LedgerResult<()> {
        let identity = require_identity(caller)?;
        authorize(identity, Action::Delete)?;

        let _gate = self.storage.write_gate()?;

        let removed = self.storage.items.remove(id)?;
        let changes = diff(Some(&removed), None);

        if let Err(e) = self.record(identity, id, Action::Delete, changes) {
            self.undo(id, self.storage.items.restore(removed));
            return Err(e);
        }
        self.persist_items();

        tracing::info!(item_id = %id, actor = %identity.username, "item deleted");
        Ok(())
    }

    /// History of one item, oldest first
    ///
    /// Deleted and unknown ids are valid; the latter yield nothing.
    pub fn get_history(
        &self,
        caller: Option<&Identity>,
        item_id: ItemId,
        filter: &HistoryFilter,
    ) -> LedgerResult<Vec<HistoryEntry>> {
        require_identity(caller)?;
        let _gate = self.storage.read_gate()?;
        Ok(self.storage.history.query(item_id, filter))
    }

    /// History of one item rendered as CSV
    pub fn export_history_csv(
        &self,
        caller: Option<&Identity>,
        item_id: ItemId,
        filter: &HistoryFilter,
    ) -> LedgerResult<Vec<u8>> {
        let entries = self.get_history(caller, item_id, filter)?;
        history_to_csv(&entries)
    }

    fn record(
        &self,
        identity: &Identity,
        item_id: ItemId,
        action: Action,
        changes: ChangeSet,
    ) -> LedgerResult<HistoryEntry> {
        self.storage
            .history
            .append(item_id, action, &identity.username, identity.role, changes)
    }

    fn undo(&self, item_id: ItemId, result: LedgerResult<()>) {
        if let Err(e) = result {
            tracing::error!(item_id = %item_id, error = %e, "failed to roll back item change");
        }
    }

    // The trail entry is the commit point. A lost snapshot is rebuilt from
    // the trail on the next load.
    fn persist_items(&self) {
        if let Err(e) = self.storage.items.save() {
            tracing::error!(error = %e, "item snapshot not written, history is ahead of items.json");
        }
    }
}
