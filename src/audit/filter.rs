//! History query filter

use chrono::{DateTime, Utc};

use super::entry::{Action, HistoryEntry};

/// Options recognised by history queries
///
/// Time bounds are inclusive. Absent options do not restrict the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub actor: Option<String>,
    pub action: Option<Action>,
    /// When false, returned entries carry no change set
    pub include_changes: bool,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            actor: None,
            action: None,
            include_changes: true,
        }
    }
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn include_changes(mut self, include: bool) -> Self {
        self.include_changes = include;
        self
    }

    /// Whether an entry passes every present option
    ///
    /// `include_changes` never affects matching.
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if self.from.is_some_and(|from| entry.changed_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.changed_at > to) {
            return false;
        }
        if let Some(actor) = &self.actor {
            if &entry.actor != actor {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        true
    }
}
