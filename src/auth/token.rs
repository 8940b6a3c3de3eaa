//! Bearer token sealing with AES-256-GCM
//!
//! A token is the URL-safe base64 encoding of `nonce || ciphertext`, where the
//! ciphertext is the JSON claims sealed under the derived token key. Each
//! token gets a fresh random nonce.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};

use super::claims::TokenClaims;
use super::identity::Identity;
use super::key_derivation::{derive_key, KeyDerivationParams, TokenKey};
use crate::error::{LedgerError, LedgerResult};
use crate::models::Role;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Issues and verifies bearer tokens
pub struct TokenAuthority {
    key: TokenKey,
}

impl TokenAuthority {
    /// Derive the token key from `secret` and build an authority around it
    pub fn new(secret: &str, params: &KeyDerivationParams) -> LedgerResult<Self> {
        Ok(Self::from_key(derive_key(secret, params)?))
    }

    pub fn from_key(key: TokenKey) -> Self {
        Self { key }
    }

    /// Issue a token for `username` valid for `ttl` from now
    pub fn issue(&self, username: &str, role: Role, ttl: Duration) -> LedgerResult<String> {
        self.issue_at(username, role, ttl, Utc::now())
    }

    /// Issue a token whose window starts at `issued_at`
    pub fn issue_at(
        &self,
        username: &str,
        role: Role,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> LedgerResult<String> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LedgerError::InvalidInput("Username cannot be empty".into()));
        }
        if ttl <= Duration::zero() {
            return Err(LedgerError::InvalidInput(
                "Token lifetime must be positive".into(),
            ));
        }

        let claims = TokenClaims::new(username, role, issued_at, issued_at + ttl);
        self.seal(&claims)
    }

    /// Seal arbitrary claims into a token
    pub fn seal(&self, claims: &TokenClaims) -> LedgerResult<String> {
        self.seal_bytes(&serde_json::to_vec(claims)?)
    }

    fn seal_bytes(&self, plaintext: &[u8]) -> LedgerResult<String> {
        let cipher = Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| LedgerError::Token(format!("Failed to create cipher: {}", e)))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| LedgerError::Token(format!("Sealing failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a token and check its time window against the current time
    pub fn verify(&self, token: &str) -> LedgerResult<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> LedgerResult<TokenClaims> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| LedgerError::Token(format!("Invalid token encoding: {}", e)))?;

        if raw.len() <= NONCE_SIZE {
            return Err(LedgerError::Token("Token is truncated".into()));
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);

        let cipher = Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| LedgerError::Token(format!("Failed to create cipher: {}", e)))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| LedgerError::Token("Token failed authentication".to_string()))?;

        let claims: TokenClaims = serde_json::from_slice(&plaintext)
            .map_err(|e| LedgerError::Token(format!("Malformed token claims: {}", e)))?;

        claims
            .validate(now)
            .map_err(|e| LedgerError::Token(e.to_string()))?;

        Ok(claims)
    }

    /// Resolve a bearer token to the caller's identity
    ///
    /// Every verification failure is reported as `Unauthorized`.
    pub fn authenticate(&self, token: &str) -> LedgerResult<Identity> {
        let claims = self.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            LedgerError::Unauthorized("invalid or expired token".into())
        })?;

        let identity = Identity::new(claims.username, claims.role);
        if !identity.is_resolved() {
            return Err(LedgerError::Unauthorized("token names no user".into()));
        }
        Ok(identity)
    }
}
