//! Configuration persistence for the trainer UI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Direction;

/// UI preferences that persist between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The currently selected theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Prompt direction for multiple-choice questions.
    #[serde(default)]
    pub direction: Direction,

    /// Id of the last chosen level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            direction: Direction::default(),
            level: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-trainer")
            .join("config.toml")
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.theme, "default");
        assert_eq!(config.direction, Direction::EnToJa);
        assert_eq!(config.level, None);
    }

    #[test]
    fn reads_saved_preferences() {
        let config = Config::parse(
            r#"
            theme = "kanagawa-wave"
            direction = "ja_to_en"
            level = "verbs-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.direction, Direction::JaToEn);
        assert_eq!(config.level.as_deref(), Some("verbs-1"));

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("direction = \"ja_to_en\""));
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("vocab-trainer-config-{}", std::process::id()))
            .join("config.toml");
        let config = Config {
            theme: "kanagawa-wave".to_string(),
            direction: Direction::JaToEn,
            level: Some("basic-2".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme, "kanagawa-wave");
        assert_eq!(loaded.direction, Direction::JaToEn);
        assert_eq!(loaded.level.as_deref(), Some("basic-2"));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn bad_direction_is_an_error() {
        assert!(Config::parse("direction = \"sideways\"").is_err());
    }
}
