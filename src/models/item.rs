//! Item model
//!
//! An item is one stock-keeping unit. Besides the item itself this module
//! defines the request shapes used to create and patch items, and their
//! field-level validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::ids::ItemId;

/// A live inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier, never changes
    pub id: ItemId,

    /// Stock-keeping unit, unique across live items
    pub sku: String,

    /// Display name
    pub name: String,

    /// Quantity on hand
    pub qty: u64,

    /// Optional storage location (shelf, bin, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last modified
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build an item from a validated creation request
    pub(crate) fn from_new(id: ItemId, new: NewItem, now: DateTime<Utc>) -> Self {
        Self {
            id,
            sku: new.sku,
            name: new.name,
            // validated non-negative before reaching the store
            qty: new.qty.max(0) as u64,
            location: new.location,
            created_at: now,
            updated_at: now,
        }
    }

    /// The attributes that audit diffs are computed over
    ///
    /// `id` and the bookkeeping timestamps are never part of a change set.
    /// An absent location is not an attribute.
    pub fn tracked_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("sku".into(), Value::from(self.sku.clone()));
        fields.insert("name".into(), Value::from(self.name.clone()));
        fields.insert("qty".into(), Value::from(self.qty));
        if let Some(location) = &self.location {
            fields.insert("location".into(), Value::from(location.clone()));
        }
        fields
    }

    /// Case-insensitive substring match on sku, name or location
    ///
    /// Location is searched as well, so a shelf or bin label finds every
    /// item stored there. A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.sku.to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
            || self
                .location
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&term))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.sku)
    }
}

/// Request to create an item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub qty: i64,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewItem {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, qty: i64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            qty,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Trim text fields and check field invariants
    ///
    /// A blank location normalises to `None`.
    pub fn normalized(self) -> Result<Self, ItemValidationError> {
        let sku = self.sku.trim().to_string();
        let name = self.name.trim().to_string();

        if sku.is_empty() {
            return Err(ItemValidationError::EmptySku);
        }
        if name.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if self.qty < 0 {
            return Err(ItemValidationError::NegativeQty(self.qty));
        }

        Ok(Self {
            sku,
            name,
            qty: self.qty,
            location: normalize_location(self.location),
        })
    }
}

/// Partial update of an item
///
/// Absent fields are left unchanged. A present but blank `location` clears
/// the location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qty: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ItemPatch {
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn qty(mut self, qty: i64) -> Self {
        self.qty = Some(qty);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether the patch names no field at all
    pub fn is_empty(&self) -> bool {
        self.sku.is_none() && self.name.is_none() && self.qty.is_none() && self.location.is_none()
    }

    /// Trim text fields and check the invariants of every present field
    pub fn normalized(self) -> Result<Self, ItemValidationError> {
        let sku = match self.sku {
            Some(sku) => {
                let sku = sku.trim().to_string();
                if sku.is_empty() {
                    return Err(ItemValidationError::EmptySku);
                }
                Some(sku)
            }
            None => None,
        };

        let name = match self.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ItemValidationError::EmptyName);
                }
                Some(name)
            }
            None => None,
        };

        if let Some(qty) = self.qty {
            if qty < 0 {
                return Err(ItemValidationError::NegativeQty(qty));
            }
        }

        Ok(Self {
            sku,
            name,
            qty: self.qty,
            location: self.location.map(|l| l.trim().to_string()),
        })
    }

    /// Compute the item this patch would produce, without touching timestamps
    pub fn apply_to(&self, item: &Item) -> Item {
        let mut next = item.clone();
        if let Some(sku) = &self.sku {
            next.sku = sku.clone();
        }
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(qty) = self.qty {
            next.qty = qty.max(0) as u64;
        }
        if let Some(location) = &self.location {
            next.location = normalize_location(Some(location.clone()));
        }
        next
    }
}

fn normalize_location(location: Option<String>) -> Option<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// Validation errors for item fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptySku,
    EmptyName,
    NegativeQty(i64),
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySku => write!(f, "sku cannot be empty"),
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::NegativeQty(qty) => write!(f, "qty must be >= 0 (got {})", qty),
        }
    }
}

impl std::error::Error for ItemValidationError {}
