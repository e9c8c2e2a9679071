//! TOML-based application configuration.
//!
//! Stores defaults applied when a fresh state blob is created, at
//! `~/.config/orbit/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::StorageError;

/// Audio cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0-100.
    #[serde(default = "default_volume")]
    pub volume: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            volume: default_volume(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/orbit/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Config {
    fn path() -> Result<PathBuf, StorageError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, StorageError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| StorageError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| StorageError::Config(e.to_string()))
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| StorageError::Config(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| StorageError::Config(e.to_string()))
    }

    /// Read a value by dotted key, for the CLI `config get` command.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "audio.enabled" => Some(self.audio.enabled.to_string()),
            "audio.volume" => Some(self.audio.volume.to_string()),
            _ => None,
        }
    }

    /// Set a value by dotted key. Returns an error for unknown keys or
    /// unparseable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match key {
            "audio.enabled" => {
                self.audio.enabled = value
                    .parse()
                    .map_err(|_| StorageError::Config(format!("not a boolean: {value}")))?;
            }
            "audio.volume" => {
                let volume: u32 = value
                    .parse()
                    .map_err(|_| StorageError::Config(format!("not a number: {value}")))?;
                if volume > 100 {
                    return Err(StorageError::Config("volume must be 0-100".to_string()));
                }
                self.audio.volume = volume;
            }
            _ => return Err(StorageError::Config(format!("unknown key: {key}"))),
        }
        Ok(())
    }

    /// All known keys with their current values.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("audio.enabled", self.audio.enabled.to_string()),
            ("audio.volume", self.audio.volume.to_string()),
        ]
    }
}

fn default_true() -> bool {
    true
}

fn default_volume() -> u32 {
    30
}
