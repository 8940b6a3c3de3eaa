//! CSV export of history entries
//!
//! One row per entry with the columns
//! `changed_at,action,actor,actor_role,changes`. Timestamps are RFC 3339 in
//! UTC with a `Z` suffix, and `changes` holds the JSON-encoded change set or is
//! empty when changes were left out of the query. Quoting follows RFC 4180.

use std::io::Write;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::audit::HistoryEntry;
use crate::error::{LedgerError, LedgerResult};

/// Column names, in output order
pub const HISTORY_CSV_HEADER: [&str; 5] =
    ["changed_at", "action", "actor", "actor_role", "changes"];

/// One exported history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCsvRow {
    pub changed_at: String,
    pub action: String,
    pub actor: String,
    pub actor_role: String,
    pub changes: String,
}

impl HistoryCsvRow {
    pub fn from_entry(entry: &HistoryEntry) -> LedgerResult<Self> {
        let changes = match &entry.changes {
            Some(changes) => serde_json::to_string(changes)
                .map_err(|e| LedgerError::Export(format!("Failed to encode changes: {}", e)))?,
            None => String::new(),
        };

        Ok(Self {
            changed_at: entry
                .changed_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            action: entry.action.to_string(),
            actor: entry.actor.clone(),
            actor_role: entry.actor_role.to_string(),
            changes,
        })
    }
}

/// Write entries as CSV, header first, even when there are no entries
pub fn write_history_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> LedgerResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HISTORY_CSV_HEADER)?;
    for entry in entries {
        csv_writer.serialize(HistoryCsvRow::from_entry(entry)?)?;
    }

    csv_writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    Ok(())
}

/// Render entries as CSV bytes
pub fn history_to_csv(entries: &[HistoryEntry]) -> LedgerResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_history_csv(entries, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{diff, Action};
    use crate::models::{EntryId, Item, ItemId, NewItem, Role};
    use chrono::{TimeZone, Utc};

    fn entry(action: Action, actor: &str, with_changes: bool) -> HistoryEntry {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let item = Item::from_new(ItemId::new(1), NewItem::new("A1", "Bolt", 5), at);
        HistoryEntry {
            id: EntryId::new(1),
            item_id: item.id,
            action,
            actor: actor.to_string(),
            actor_role: Role::Manager,
            changed_at: at,
            changes: with_changes.then(|| diff(None, Some(&item))),
        }
    }

    fn rows(bytes: &[u8]) -> Vec<HistoryCsvRow> {
        csv::Reader::from_reader(bytes)
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_header_only_for_no_entries() {
        let bytes = history_to_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "changed_at,action,actor,actor_role,changes\n"
        );
    }

    #[test]
    fn test_row_fields() {
        let bytes = history_to_csv(&[entry(Action::Create, "alice", true)]).unwrap();
        let rows = rows(&bytes);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].changed_at, "2024-03-01T12:30:00Z");
        assert_eq!(rows[0].action, "create");
        assert_eq!(rows[0].actor, "alice");
        assert_eq!(rows[0].actor_role, "manager");

        let changes: serde_json::Value = serde_json::from_str(&rows[0].changes).unwrap();
        assert_eq!(changes["qty"]["to"], 5);
        assert!(changes["qty"]["from"].is_null());
    }

    #[test]
    fn test_omitted_changes_are_empty() {
        let bytes = history_to_csv(&[entry(Action::Delete, "bob", false)]).unwrap();
        assert_eq!(rows(&bytes)[0].changes, "");
    }

    #[test]
    fn test_quoting() {
        let bytes = history_to_csv(&[entry(Action::Update, "o'neil, \"jr\"", true)]).unwrap();
        assert_eq!(rows(&bytes)[0].actor, "o'neil, \"jr\"");
    }
}
