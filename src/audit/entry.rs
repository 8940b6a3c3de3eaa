//! History entry data structures
//!
//! Defines the audited actions and the immutable record appended for each
//! successful mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::diff::ChangeSet;
use crate::models::{EntryId, ItemId, Role};

/// Types of mutations that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Item was created
    Create,
    /// Item was updated
    Update,
    /// Item was deleted
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// A single audit record
///
/// Records one mutation of one item together with who made it and what
/// changed. Entries are never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Trail-wide sequence number
    pub id: EntryId,

    /// The item this entry describes (which may no longer exist)
    pub item_id: ItemId,

    /// Kind of mutation
    pub action: Action,

    /// Username of the caller at the time of the action
    pub actor: String,

    /// Role of the caller at the time of the action
    pub actor_role: Role,

    /// When the mutation was recorded (UTC)
    pub changed_at: DateTime<Utc>,

    /// Field changes; omitted when a query asks for entries without changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
}

impl HistoryEntry {
    /// Copy of this entry with the change set stripped
    pub fn without_changes(&self) -> Self {
        Self {
            changes: None,
            ..self.clone()
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} item {} by {} ({})",
            self.changed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action.as_str().to_uppercase(),
            self.item_id,
            self.actor,
            self.actor_role
        );

        if let Some(summary) = self.changes.as_ref().and_then(ChangeSet::summary) {
            output.push_str(&format!("\n  Changes: {}", summary));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> HistoryEntry {
        HistoryEntry {
            id: EntryId::new(1),
            item_id: ItemId::new(7),
            action: Action::Update,
            actor: "alice".into(),
            actor_role: Role::Manager,
            changed_at: Utc::now(),
            changes: Some(ChangeSet::new()),
        }
    }

    #[test]
    fn test_action_display_and_parse() {
        assert_eq!(Action::Create.to_string(), "create");
        assert_eq!("DELETE".parse::<Action>().unwrap(), Action::Delete);
        assert!("archive".parse::<Action>().is_err());
    }

    #[test]
    fn test_without_changes() {
        let entry = sample_entry();
        let stripped = entry.without_changes();
        assert!(stripped.changes.is_none());
        assert_eq!(stripped.id, entry.id);
        assert_eq!(stripped.changed_at, entry.changed_at);
    }

    #[test]
    fn test_serialization_omits_missing_changes() {
        let entry = sample_entry().without_changes();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("changes"));

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_human_readable_format() {
        let formatted = sample_entry().format_human_readable();
        assert!(formatted.contains("UPDATE"));
        assert!(formatted.contains("item 7"));
        assert!(formatted.contains("alice (manager)"));
    }
}
