//! Persisted settings and credential resolution.
//!
//! Load-at-startup, persist-on-change. The credential resolves in priority
//! order: explicitly provided value, then the environment, then the settings
//! file. Absence of all three selects rule-based-only mode.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted for the text-service credential.
pub const API_KEY_ENV: &str = "GRIDPILOT_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("settings serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stored credential for the external text service.
    pub api_key: Option<String>,
    /// Model requested from the service.
    pub model: String,
    /// Classification attempts per prompt.
    pub max_retries: u32,
    /// Backoff base in milliseconds; attempt N waits N times this.
    pub retry_delay_ms: u64,
    /// Prompt history entries kept.
    pub max_history: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            max_history: 10,
        }
    }
}

/// Settings bound to their file on disk.
pub struct SettingsStore {
    path: PathBuf,
    pub settings: Settings,
}

impl SettingsStore {
    /// The platform config file location ("~/.config/gridpilot/settings.toml"
    /// on Linux). None when no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gridpilot")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from a file; a missing file yields defaults.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let settings = if path.exists() {
            toml::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            Settings::default()
        };
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.settings)?)?;
        Ok(())
    }

    /// Store a credential and persist immediately.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), ConfigError> {
        self.settings.api_key = Some(api_key.to_string());
        self.save()
    }

    /// Resolve the credential: explicit value, then environment, then the
    /// stored setting.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(key) = explicit {
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.settings.api_key.clone().filter(|k| !k.is_empty())
    }
}
