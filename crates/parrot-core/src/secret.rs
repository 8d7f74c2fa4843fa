//! Secret configuration file storage.
//!
//! Provides read-only loading of API credentials from
//! `~/.config/parrot/secret.json`. Absence of a credential fails closed: the
//! dependent feature stays disabled rather than sending an empty bearer
//! token.
//!
//! # Security Note
//!
//! The secret file is plaintext JSON and should carry restrictive
//! permissions (e.g. 600 on Unix). Secrets must never appear in logs or
//! error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ParrotError, Result};

/// Credentials for the completion endpoint used by the card generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSecret {
    pub api_key: String,
}

/// Root of the secret configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    pub completion: Option<CompletionSecret>,
}

impl SecretConfig {
    /// Returns the completion API key when one is configured and non-empty.
    ///
    /// An entry with a blank key is treated the same as no entry at all, so
    /// an empty credential can never reach a request header.
    pub fn completion_api_key(&self) -> Option<&str> {
        self.completion
            .as_ref()
            .map(|secret| secret.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json from the user's config directory
/// - Parse JSON into the `SecretConfig` domain model
///
/// Does NOT:
/// - Write or modify secret files (read-only)
/// - Validate credentials against the remote service
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a storage pointing at the default path
    /// (`~/.config/parrot/secret.json`).
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| ParrotError::config("could not determine config directory"))?;
        Ok(Self {
            path: dir.join("parrot").join("secret.json"),
        })
    }

    /// Creates a storage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// True when the secret file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the secret configuration.
    ///
    /// A missing file yields an empty `SecretConfig` (features depending on
    /// secrets then fail closed); a malformed file is an error.
    pub fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Ok(SecretConfig::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecretStorage::with_path(dir.path().join("secret.json"));
        assert!(!storage.exists());
        let config = storage.load().unwrap();
        assert!(config.completion_api_key().is_none());
    }

    #[test]
    fn blank_api_key_is_treated_as_absent() {
        let config = SecretConfig {
            completion: Some(CompletionSecret {
                api_key: "   ".to_string(),
            }),
        };
        assert!(config.completion_api_key().is_none());
    }

    #[test]
    fn configured_key_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, r#"{"completion": {"api_key": "sk-test"}}"#).unwrap();

        let config = SecretStorage::with_path(path).load().unwrap();
        assert_eq!(config.completion_api_key(), Some("sk-test"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = SecretStorage::with_path(path).load().unwrap_err();
        assert!(matches!(err, ParrotError::Serialization { .. }));
    }
}
