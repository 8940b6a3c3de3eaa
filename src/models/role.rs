//! Role model
//!
//! Roles form a total order `viewer < manager < admin`. Write access is a
//! rank threshold; delete access is a dedicated capability held by admins
//! only, so adding a role above manager never grants delete implicitly.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Privilege level of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Manager,
    Admin,
}

impl Role {
    /// All roles, lowest rank first
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Manager, Role::Admin];

    /// Numeric rank used for write gating
    pub fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Manager => 1,
            Role::Admin => 2,
        }
    }

    /// Whether this role may create and update items
    pub fn can_write(self) -> bool {
        self.rank() >= Role::Manager.rank()
    }

    /// Whether this role may delete items
    pub fn can_delete(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Parse a role name strictly (trimmed, case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Some(Role::Viewer),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Parse a role name, mapping anything unrecognised to `Viewer`
    pub fn parse_or_lowest(s: &str) -> Self {
        Self::parse(s).unwrap_or(Role::Viewer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored and transported roles fail closed.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse_or_lowest(&raw))
    }
}
