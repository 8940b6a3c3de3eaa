//! Append-only audit trail
//!
//! Holds every history entry in memory, indexed by item, and mirrors each
//! append to a line-delimited JSON log (JSONL) that is flushed before the
//! append returns. Entries are never rewritten or removed.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryId, ItemId, Role};

use super::diff::ChangeSet;
use super::entry::{Action, HistoryEntry};
use super::filter::HistoryFilter;

#[derive(Debug, Default)]
struct TrailState {
    entries: Vec<HistoryEntry>,
    /// item id -> positions in `entries`, in append order
    by_item: HashMap<ItemId, Vec<usize>>,
    last_id: EntryId,
}

impl TrailState {
    fn push(&mut self, entry: HistoryEntry) {
        if entry.id > self.last_id {
            self.last_id = entry.id;
        }
        self.by_item
            .entry(entry.item_id)
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    fn last_changed_at(&self, item_id: ItemId) -> Option<DateTime<Utc>> {
        self.by_item
            .get(&item_id)
            .and_then(|positions| positions.last())
            .map(|&pos| self.entries[pos].changed_at)
    }
}

/// The append-only sequence of history entries
pub struct AuditTrail {
    /// Path to the JSONL log file
    log_path: PathBuf,
    state: RwLock<TrailState>,
}

impl AuditTrail {
    /// Create an empty trail backed by the given log file
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            state: RwLock::new(TrailState::default()),
        }
    }

    /// Replace the in-memory trail with the contents of the log file
    pub(crate) fn load(&self) -> LedgerResult<()> {
        let entries = read_log(&self.log_path)?;

        let mut state = self
            .state
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *state = TrailState::default();
        for entry in entries {
            state.push(entry);
        }

        tracing::debug!(
            entries = state.entries.len(),
            path = %self.log_path.display(),
            "audit trail loaded"
        );
        Ok(())
    }

    /// Append an entry stamped with the current time
    pub(crate) fn append(
        &self,
        item_id: ItemId,
        action: Action,
        actor: &str,
        actor_role: Role,
        changes: ChangeSet,
    ) -> LedgerResult<HistoryEntry> {
        self.append_at(item_id, action, actor, actor_role, changes, Utc::now())
    }

    /// Append an entry stamped with `at`
    ///
    /// The stamp is raised to the item's previous `changed_at` if needed so
    /// each item's entries stay in non-decreasing time order.
    pub(crate) fn append_at(
        &self,
        item_id: ItemId,
        action: Action,
        actor: &str,
        actor_role: Role,
        changes: ChangeSet,
        at: DateTime<Utc>,
    ) -> LedgerResult<HistoryEntry> {
        let mut state = self
            .state
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let changed_at = match state.last_changed_at(item_id) {
            Some(last) if last > at => last,
            _ => at,
        };

        let entry = HistoryEntry {
            id: state.last_id.next(),
            item_id,
            action,
            actor: actor.to_string(),
            actor_role,
            changed_at,
            changes: Some(changes),
        };

        // Durable first: a failed write leaves the trail untouched.
        self.write_line(&entry)?;
        state.push(entry.clone());

        Ok(entry)
    }

    /// Entries for one item that pass the filter, oldest first
    ///
    /// An unknown item yields an empty result.
    pub fn query(&self, item_id: ItemId, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let state = self.read_state();

        let Some(positions) = state.by_item.get(&item_id) else {
            return Vec::new();
        };

        positions
            .iter()
            .map(|&pos| &state.entries[pos])
            .filter(|entry| filter.matches(entry))
            .map(|entry| {
                if filter.include_changes {
                    entry.clone()
                } else {
                    entry.without_changes()
                }
            })
            .collect()
    }

    /// Number of entries recorded for an item
    pub fn count_for(&self, item_id: ItemId) -> usize {
        self.read_state()
            .by_item
            .get(&item_id)
            .map_or(0, Vec::len)
    }

    /// Every item id that has at least one entry, ascending
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.read_state().by_item.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The highest item id the trail has seen, deleted items included
    pub fn highest_item_id(&self) -> Option<ItemId> {
        self.read_state().by_item.keys().copied().max()
    }

    /// Total number of entries in the trail
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    // A poisoned lock still guards a valid prefix of the trail, since entries
    // are only ever pushed after they are fully built.
    fn read_state(&self) -> RwLockReadGuard<'_, TrailState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line(&self, entry: &HistoryEntry) -> LedgerResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize history entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| LedgerError::Io(format!("Failed to write history entry: {}", e)))?;

        file.flush()
            .map_err(|e| LedgerError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

/// Read all entries from a JSONL log, oldest first
fn read_log(path: &Path) -> LedgerResult<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            LedgerError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
        })?;

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let entry: HistoryEntry = serde_json::from_str(&line).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to parse history entry at line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        entries.push(entry);
    }

    Ok(entries)
}
