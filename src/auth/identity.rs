//! Request-scoped caller identity

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Role;

/// The caller of one request, as resolved by the authenticator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Whether the identity names an actual user
    pub fn is_resolved(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_resolved() {
        assert!(Identity::new("alice", Role::Admin).is_resolved());
        assert!(!Identity::new("  ", Role::Admin).is_resolved());
    }

    #[test]
    fn test_display() {
        assert_eq!(Identity::new("bob", Role::Manager).to_string(), "bob (manager)");
    }
}
