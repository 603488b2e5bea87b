//! Configuration persistence for flashdeck.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage::DeckStore;

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The currently selected theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Location of the deck collection; the data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decks_file: Option<PathBuf>,

    /// How long to wait for the deck store lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Cap on never-reviewed cards queued in one study session.
    #[serde(default = "default_new_cards_per_session")]
    pub new_cards_per_session: usize,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    2000
}

fn default_new_cards_per_session() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            decks_file: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            new_cards_per_session: default_new_cards_per_session(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashdeck")
            .join("config.toml")
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save config to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn decks_file(&self) -> PathBuf {
        self.decks_file
            .clone()
            .unwrap_or_else(DeckStore::default_path)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.lock_timeout(), Duration::from_secs(2));
        assert_eq!(config.decks_file(), DeckStore::default_path());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"gruvbox\"\ndecks_file = \"/srv/decks.json\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, "gruvbox");
        assert_eq!(config.decks_file(), PathBuf::from("/srv/decks.json"));
        assert_eq!(config.new_cards_per_session, 20);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            lock_timeout_ms: 500,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "lock_timeout_ms = \"soon\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
