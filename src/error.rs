//! Custom error types for StockLedger
//!
//! This module defines the error hierarchy for the ledger using thiserror.
//! The first five variants are the domain outcomes every façade maps to a
//! response; the rest are infrastructure failures.

use thiserror::Error;

/// The main error type for StockLedger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No identity, or an identity that could not be resolved
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity is valid but its role does not grant the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed request body
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Uniqueness violations
    #[error("{entity_type} already exists: {identifier}")]
    Conflict {
        entity_type: &'static str,
        identifier: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Token sealing or verification errors
    #[error("Token error: {0}")]
    Token(String),
}

impl LedgerError {
    /// Create a "not found" error for items
    pub fn item_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Item",
            identifier: identifier.to_string(),
        }
    }

    /// Create a conflict error for a SKU already held by a live item
    pub fn sku_conflict(sku: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type: "SKU",
            identifier: sku.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this is an input validation error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for StockLedger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
