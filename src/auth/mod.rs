//! Authentication for StockLedger
//!
//! Bearer tokens are claims sealed with AES-256-GCM under a key derived from
//! the operator secret with Argon2id. Verified tokens resolve to an
//! [`Identity`] that the mutation service consumes per request.

pub mod claims;
pub mod identity;
pub mod key_derivation;
pub mod token;

pub use claims::{TokenClaims, TokenValidationError};
pub use identity::Identity;
pub use key_derivation::{derive_key, KeyDerivationParams, TokenKey};
pub use token::TokenAuthority;
