//! Root configuration loaded from `~/.config/parrot/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app_state::ChatSettings;
use crate::error::Result;

/// Conversation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Delay before the echo reply is appended, in milliseconds.
    pub reply_delay_ms: u64,
    /// BCP 47 language tag handed to the speech recognizer.
    pub language: String,
    /// Feed scripted dictation into the voice adapter instead of requiring a
    /// platform recognizer. Off by default.
    pub simulate_voice: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            language: "en-US".to_string(),
            simulate_voice: false,
        }
    }
}

/// The root of the user configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub chat: ChatConfig,
    pub settings: ChatSettings,
}

impl RootConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads the configuration from the given path.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads from the default location, falling back to defaults when the
    /// file is absent or unreadable. A malformed file logs a warning rather
    /// than taking the app down.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring malformed config at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// `~/.config/parrot/config.toml`, when a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parrot").join("config.toml"))
    }
}
