//! User settings for StockLedger
//!
//! Manages the no-op update policy, token lifetime and key derivation
//! parameters, and the default log level.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::auth::KeyDerivationParams;
use crate::error::LedgerError;

/// What to do with an update whose change set is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoopUpdatePolicy {
    /// Leave the item untouched and append nothing (default)
    #[default]
    Skip,
    /// Append an `update` entry with an empty change set
    Record,
}

/// User settings for StockLedger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Handling of updates that change nothing
    #[serde(default)]
    pub noop_updates: NoopUpdatePolicy,

    /// Lifetime of issued tokens, in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,

    /// Argon2 parameters used to derive the token key from the secret
    #[serde(default)]
    pub token_key: KeyDerivationParams,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_token_ttl_hours() -> u32 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            noop_updates: NoopUpdatePolicy::default(),
            token_ttl_hours: default_token_ttl_hours(),
            token_key: KeyDerivationParams::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Generate a token key salt if none is stored yet
    ///
    /// Returns true when the settings changed and should be saved.
    pub fn ensure_token_salt(&mut self) -> bool {
        if self.token_key.salt.is_empty() {
            self.token_key = KeyDerivationParams::new();
            true
        } else {
            false
        }
    }

    /// Token lifetime as a chrono duration
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.token_ttl_hours))
    }
}
