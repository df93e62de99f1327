//! Prompt history, capped and persisted alongside the settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    entries: Vec<String>,
}

#[derive(Debug)]
pub struct PromptHistory {
    entries: Vec<String>,
    max_items: usize,
}

impl PromptHistory {
    pub fn new(max_items: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_items: max_items.max(1),
        }
    }

    /// Load from a TOML file; a missing file yields an empty history.
    pub fn load(path: &Path, max_items: usize) -> Result<Self, ConfigError> {
        let mut history = Self::new(max_items);
        if path.exists() {
            let file: HistoryFile = toml::from_str(&std::fs::read_to_string(path)?)?;
            history.entries = file.entries;
            history.truncate();
        }
        Ok(history)
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gridpilot")
            .map(|dirs| dirs.config_dir().join("history.toml"))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = HistoryFile {
            entries: self.entries.clone(),
        };
        std::fs::write(path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Append a prompt, dropping the oldest entries past the cap.
    pub fn push(&mut self, prompt: &str) {
        self.entries.push(prompt.to_string());
        self.truncate();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn truncate(&mut self) {
        if self.entries.len() > self.max_items {
            let excess = self.entries.len() - self.max_items;
            self.entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PromptHistory;

    #[test]
    fn test_push_caps_at_max_items() {
        let mut history = PromptHistory::new(3);
        for i in 0..5 {
            history.push(&format!("prompt {}", i));
        }
        assert_eq!(history.entries(), ["prompt 2", "prompt 3", "prompt 4"]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.toml");

        let mut history = PromptHistory::new(10);
        history.push("sum column B");
        history.push("make a chart");
        history.save(&path).unwrap();

        let loaded = PromptHistory::load(&path, 10).unwrap();
        assert_eq!(loaded.entries(), ["sum column B", "make a chart"]);
    }

    #[test]
    fn test_load_truncates_to_new_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.toml");

        let mut history = PromptHistory::new(10);
        for i in 0..6 {
            history.push(&format!("p{}", i));
        }
        history.save(&path).unwrap();

        let loaded = PromptHistory::load(&path, 2).unwrap();
        assert_eq!(loaded.entries(), ["p4", "p5"]);
    }
}
