//! Item repository for JSON storage
//!
//! Holds the live items in memory with a SKU index, and persists them to
//! items.json together with the last id handed out, so ids are never reused.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Item, ItemId, ItemPatch, NewItem};

use super::file_io::{read_snapshot, write_snapshot};

/// Serializable item data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ItemData {
    #[serde(default)]
    last_id: ItemId,
    items: Vec<Item>,
}

#[derive(Debug, Default)]
struct ItemState {
    /// Keyed by id, so iteration follows creation order
    items: BTreeMap<ItemId, Item>,
    /// Index: sku -> item id
    by_sku: HashMap<String, ItemId>,
    last_id: ItemId,
}

impl ItemState {
    fn sku_taken_by_other(&self, sku: &str, id: Option<ItemId>) -> bool {
        match self.by_sku.get(sku) {
            Some(&owner) => Some(owner) != id,
            None => false,
        }
    }

    fn put(&mut self, item: Item) {
        if let Some(old) = self.items.get(&item.id) {
            if old.sku != item.sku && self.by_sku.get(&old.sku) == Some(&item.id) {
                self.by_sku.remove(&old.sku);
            }
        }
        self.by_sku.insert(item.sku.clone(), item.id);
        self.items.insert(item.id, item);
    }
}

/// Repository for item persistence
pub struct ItemRepository {
    path: PathBuf,
    state: RwLock<ItemState>,
}

impl ItemRepository {
    /// Create a new item repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(ItemState::default()),
        }
    }

    /// Load items from disk
    pub(crate) fn load(&self) -> LedgerResult<()> {
        let file_data: ItemData = read_snapshot(&self.path)?;
        let mut state = self.write_state()?;

        *state = ItemState::default();
        let highest = file_data.items.iter().map(|i| i.id).max().unwrap_or_default();
        state.last_id = file_data.last_id.max(highest);

        for item in file_data.items {
            if state.sku_taken_by_other(&item.sku, Some(item.id)) {
                return Err(LedgerError::Storage(format!(
                    "Duplicate sku '{}' in {}",
                    item.sku,
                    self.path.display()
                )));
            }
            state.put(item);
        }

        tracing::debug!(items = state.items.len(), path = %self.path.display(), "items loaded");
        Ok(())
    }

    /// Save items to disk
    pub(crate) fn save(&self) -> LedgerResult<()> {
        let state = self.read_state()?;

        let file_data = ItemData {
            last_id: state.last_id,
            items: state.items.values().cloned().collect(),
        };
        write_snapshot(&self.path, &file_data)
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> LedgerResult<Item> {
        self.read_state()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::item_not_found(id))
    }

    /// List items in creation order, optionally filtered by a search term
    pub fn list(&self, search: Option<&str>) -> LedgerResult<Vec<Item>> {
        let state = self.read_state()?;
        let term = search.map(str::trim).filter(|t| !t.is_empty());

        Ok(state
            .items
            .values()
            .filter(|item| term.map_or(true, |t| item.matches_search(t)))
            .cloned()
            .collect())
    }

    /// Insert a new item, assigning the next id
    ///
    /// Fails with a conflict if the sku is held by a live item.
    pub(crate) fn insert(&self, new: NewItem) -> LedgerResult<Item> {
        let mut state = self.write_state()?;

        if state.sku_taken_by_other(&new.sku, None) {
            return Err(LedgerError::sku_conflict(new.sku));
        }

        let id = state.last_id.next();
        state.last_id = id;

        let item = Item::from_new(id, new, Utc::now());
        state.put(item.clone());
        Ok(item)
    }

    /// Apply a patch to a live item
    ///
    /// Fails with not-found for unknown ids and with a conflict when the
    /// new sku belongs to a different live item.
    pub(crate) fn replace(&self, id: ItemId, patch: &ItemPatch) -> LedgerResult<Item> {
        let mut state = self.write_state()?;

        let current = state
            .items
            .get(&id)
            .ok_or_else(|| LedgerError::item_not_found(id))?;

        let mut next = patch.apply_to(current);
        if state.sku_taken_by_other(&next.sku, Some(id)) {
            return Err(LedgerError::sku_conflict(next.sku));
        }

        next.updated_at = Utc::now();
        state.put(next.clone());
        Ok(next)
    }

    /// Remove a live item, returning its last snapshot
    pub(crate) fn remove(&self, id: ItemId) -> LedgerResult<Item> {
        let mut state = self.write_state()?;

        let item = state
            .items
            .remove(&id)
            .ok_or_else(|| LedgerError::item_not_found(id))?;
        if state.by_sku.get(&item.sku) == Some(&id) {
            state.by_sku.remove(&item.sku);
        }
        Ok(item)
    }

    /// Put a previous snapshot back in place (used to undo a mutation)
    pub(crate) fn restore(&self, item: Item) -> LedgerResult<()> {
        let mut state = self.write_state()?;
        state.put(item);
        Ok(())
    }

    /// Never hand out an id at or below `id` again
    pub(crate) fn reserve_ids_through(&self, id: ItemId) -> LedgerResult<()> {
        let mut state = self.write_state()?;
        state.last_id = state.last_id.max(id);
        Ok(())
    }

    /// Whether a live item holds this sku
    pub fn contains_sku(&self, sku: &str) -> LedgerResult<bool> {
        Ok(self.read_state()?.by_sku.contains_key(sku))
    }

    /// Count live items
    pub fn count(&self) -> LedgerResult<usize> {
        Ok(self.read_state()?.items.len())
    }

    fn read_state(&self) -> LedgerResult<RwLockReadGuard<'_, ItemState>> {
        self.state
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_state(&self) -> LedgerResult<RwLockWriteGuard<'_, ItemState>> {
        self.state
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ItemRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.json");
        let repo = ItemRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let (_temp_dir, repo) = create_test_repo();

        let a = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        let b = repo.insert(NewItem::new("B2", "Gadget", 1)).unwrap();

        assert_eq!(a.id, ItemId::new(1));
        assert_eq!(b.id, ItemId::new(2));
        assert_eq!(repo.get(a.id).unwrap().name, "Widget");
    }

    #[test]
    fn test_insert_duplicate_sku_conflicts() {
        let (_temp_dir, repo) = create_test_repo();

        repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        let result = repo.insert(NewItem::new("A1", "Other", 1));
        assert!(matches!(result, Err(LedgerError::Conflict { .. })));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        assert!(repo.get(ItemId::new(3)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_search_and_order() {
        let (_temp_dir, repo) = create_test_repo();

        repo.insert(NewItem::new("W-100", "Widget", 5)).unwrap();
        repo.insert(NewItem::new("G-200", "Gadget", 1)).unwrap();
        repo.insert(NewItem::new("W-300", "Sprocket", 2)).unwrap();

        let all = repo.list(None).unwrap();
        let skus: Vec<_> = all.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["W-100", "G-200", "W-300"]);

        let matched = repo.list(Some("w-")).unwrap();
        assert_eq!(matched.len(), 2);

        let by_name = repo.list(Some("GADGET")).unwrap();
        assert_eq!(by_name.len(), 1);

        assert_eq!(repo.list(Some("   ")).unwrap().len(), 3);
    }

    #[test]
    fn test_replace() {
        let (_temp_dir, repo) = create_test_repo();
        let item = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();

        let updated = repo.replace(item.id, &ItemPatch::default().qty(8)).unwrap();
        assert_eq!(updated.qty, 8);
        assert_eq!(updated.created_at, item.created_at);
        assert!(updated.updated_at >= item.updated_at);
    }

    #[test]
    fn test_replace_sku_conflict_and_rename() {
        let (_temp_dir, repo) = create_test_repo();
        let a = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        repo.insert(NewItem::new("B2", "Gadget", 1)).unwrap();

        let result = repo.replace(a.id, &ItemPatch::default().sku("B2"));
        assert!(matches!(result, Err(LedgerError::Conflict { .. })));

        // Keeping its own sku is not a conflict
        repo.replace(a.id, &ItemPatch::default().sku("A1")).unwrap();

        // Renaming frees the old sku
        repo.replace(a.id, &ItemPatch::default().sku("A9")).unwrap();
        assert!(!repo.contains_sku("A1").unwrap());
        repo.insert(NewItem::new("A1", "Reused", 0)).unwrap();
    }

    #[test]
    fn test_replace_missing_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let result = repo.replace(ItemId::new(1), &ItemPatch::default().qty(1));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove() {
        let (_temp_dir, repo) = create_test_repo();
        let item = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();

        let removed = repo.remove(item.id).unwrap();
        assert_eq!(removed, item);
        assert!(repo.get(item.id).unwrap_err().is_not_found());
        assert!(repo.remove(item.id).unwrap_err().is_not_found());

        // ids are not reused after delete
        let next = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        assert_eq!(next.id, ItemId::new(2));
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();

        let a = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        let b = repo.insert(NewItem::new("B2", "Gadget", 1)).unwrap();
        repo.remove(b.id).unwrap();
        repo.save().unwrap();

        let repo2 = ItemRepository::new(temp_dir.path().join("items.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.get(a.id).unwrap(), a);
        assert_eq!(repo2.count().unwrap(), 1);

        let c = repo2.insert(NewItem::new("C3", "Cog", 1)).unwrap();
        assert_eq!(c.id, ItemId::new(3));
    }

    #[test]
    fn test_restore_over_stale_sku_keeps_index() {
        let (_temp_dir, repo) = create_test_repo();
        let a = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        let b = repo.insert(NewItem::new("B2", "Gadget", 1)).unwrap();

        // b takes over A1 while a still holds it in a stale snapshot
        let mut moved = b.clone();
        moved.sku = "A1".into();
        repo.restore(moved).unwrap();
        repo.remove(a.id).unwrap();

        assert!(repo.contains_sku("A1").unwrap());
        assert!(repo.insert(NewItem::new("A1", "Dup", 1)).is_err());
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let (_temp_dir, repo) = create_test_repo();
        repo.reserve_ids_through(ItemId::new(4)).unwrap();
        repo.reserve_ids_through(ItemId::new(2)).unwrap();

        let item = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        assert_eq!(item.id, ItemId::new(5));
    }

    #[test]
    fn test_restore() {
        let (_temp_dir, repo) = create_test_repo();
        let item = repo.insert(NewItem::new("A1", "Widget", 5)).unwrap();
        repo.replace(item.id, &ItemPatch::default().sku("Z9")).unwrap();

        repo.restore(item.clone()).unwrap();
        assert_eq!(repo.get(item.id).unwrap(), item);
        assert!(repo.contains_sku("A1").unwrap());
        assert!(!repo.contains_sku("Z9").unwrap());
    }
}
