//! History display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::audit::HistoryEntry;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "When (UTC)")]
    changed_at: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Actor")]
    actor: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            changed_at: entry.changed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: entry.action.to_string(),
            actor: entry.actor.clone(),
            role: entry.actor_role.to_string(),
            changes: entry
                .changes
                .as_ref()
                .and_then(|c| c.summary())
                .unwrap_or_default(),
        }
    }
}

/// Format history entries as a table, oldest first
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history found.\n".to_string();
    }

    let mut table = Table::new(entries.iter().map(HistoryRow::from));
    table.with(Style::psql());
    format!("{}\n", table)
}
