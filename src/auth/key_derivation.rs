//! Token key derivation using Argon2id
//!
//! Derives the 256-bit token sealing key from the operator-supplied secret.
//! The salt and cost parameters live in the settings file so every process
//! derives the same key from the same secret.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, Params,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LedgerError, LedgerResult};

/// Parameters for key derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt for key derivation
    pub salt: String,
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 2)
    pub time_cost: u32,
    /// Parallelism degree (default: 1)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            salt: String::new(), // Generated on first use
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KeyDerivationParams {
    /// Create new params with a random salt
    pub fn new() -> Self {
        let salt = SaltString::generate(&mut OsRng);
        Self {
            salt: salt.to_string(),
            ..Default::default()
        }
    }

    /// Create params with specific values
    pub fn with_values(salt: String, memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            salt,
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// A derived token key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct TokenKey {
    key: [u8; 32],
}

impl TokenKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

/// Derive the token key from a secret
pub fn derive_key(secret: &str, params: &KeyDerivationParams) -> LedgerResult<TokenKey> {
    if secret.is_empty() {
        return Err(LedgerError::Config("Token secret cannot be empty".into()));
    }
    if params.salt.len() < 8 {
        return Err(LedgerError::Config(
            "Token key salt is missing or shorter than 8 bytes".into(),
        ));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32), // AES-256 key length
    )
    .map_err(|e| LedgerError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(secret.as_bytes(), params.salt.as_bytes(), &mut key)
        .map_err(|e| LedgerError::Token(format!("Key derivation failed: {}", e)))?;

    let derived = TokenKey::from_bytes(key);
    key.zeroize();
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params(salt: &str) -> KeyDerivationParams {
        KeyDerivationParams::with_values(salt.to_string(), 64, 1, 1)
    }

    #[test]
    fn test_same_secret_same_key() {
        let params = cheap_params("saltsaltsalt");
        let key1 = derive_key("secret", &params).unwrap();
        let key2 = derive_key("secret", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let params = cheap_params("saltsaltsalt");
        let key1 = derive_key("secret-one", &params).unwrap();
        let key2 = derive_key("secret-two", &params).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("secret", &cheap_params("saltsaltsalt")).unwrap();
        let key2 = derive_key("secret", &cheap_params("peppersalt!!")).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_generated_salt_is_usable() {
        let mut params = KeyDerivationParams::new();
        params.memory_cost = 64;
        params.time_cost = 1;
        assert!(derive_key("secret", &params).is_ok());
    }

    #[test]
    fn test_rejects_empty_secret_and_missing_salt() {
        assert!(matches!(
            derive_key("", &cheap_params("saltsaltsalt")),
            Err(LedgerError::Config(_))
        ));
        assert!(matches!(
            derive_key("secret", &KeyDerivationParams::default()),
            Err(LedgerError::Config(_))
        ));
    }
}
