use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

/// Claims sealed inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unique token id.
    pub jti: Uuid,

    /// Username the token was issued to.
    pub username: String,

    /// Role granted by the token. Unknown values decode as `viewer`.
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl TokenClaims {
    pub fn new(
        username: impl Into<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            jti: Uuid::new_v4(),
            username: username.into(),
            role,
            issued_at,
            expires_at,
        }
    }

    /// Check the time window against `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        if self.expires_at <= self.issued_at {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(TokenValidationError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(TokenValidationError::Expired);
        }
        Ok(())
    }
}
