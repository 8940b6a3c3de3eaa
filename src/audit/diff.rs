//! Change-set generation for the audit trail
//!
//! Compares two optional item snapshots field by field and records every
//! differing attribute as a `{from, to}` pair.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::Item;

/// One changed attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: Value,
    pub to: Value,
}

/// Mapping from field name to its change, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, FieldChange>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, field: &str, from: Value, to: Value) {
        self.0.insert(field.to_string(), FieldChange { from, to });
    }

    /// Human-readable one-line summary, e.g. `qty: 5 -> 8`
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let parts: Vec<String> = self
            .iter()
            .map(|(field, change)| {
                format!(
                    "{}: {} -> {}",
                    field,
                    format_value(&change.from),
                    format_value(&change.to)
                )
            })
            .collect();
        Some(parts.join(", "))
    }
}

/// Compute the change set between two item snapshots
///
/// `before = None` describes a create, `after = None` a delete. Never fails.
pub fn diff(before: Option<&Item>, after: Option<&Item>) -> ChangeSet {
    let empty = Map::new();
    let before_fields = before.map(Item::tracked_fields);
    let after_fields = after.map(Item::tracked_fields);

    diff_fields(
        before_fields.as_ref().unwrap_or(&empty),
        after_fields.as_ref().unwrap_or(&empty),
    )
}

/// Field-by-field comparison of two flat JSON objects
///
/// A key missing on one side is treated as `null` on that side.
pub fn diff_fields(before: &Map<String, Value>, after: &Map<String, Value>) -> ChangeSet {
    let mut changes = ChangeSet::new();

    // Modified and removed fields
    for (key, before_val) in before {
        match after.get(key) {
            Some(after_val) if after_val == before_val => {}
            Some(after_val) => changes.insert(key, before_val.clone(), after_val.clone()),
            None => changes.insert(key, before_val.clone(), Value::Null),
        }
    }

    // Added fields
    for (key, after_val) in after {
        if !before.contains_key(key) {
            changes.insert(key, Value::Null, after_val.clone());
        }
    }

    changes
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
