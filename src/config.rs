use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::DEFAULT_AI_API_URL;
use crate::bible::DEFAULT_BIBLE_API_URL;
use crate::language::Language;

/// The only state that survives restarts: selected version, its display
/// name, and the interface language. Everything else is rebuilt from the
/// fetch cascade on startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Preferences {
    pub version: String,
    pub version_name: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub ai_api_key: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: "gae".to_string(),
            version_name: "개역개정".to_string(),
            language: Language::Korean,
            ai_api_key: None,
        }
    }
}

impl Preferences {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("bible-ai").join("preferences.json"))
    }
}

/// Endpoint and credential resolution: environment variables win, the
/// preferences file is the fallback for the API key.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bible_api_url: String,
    pub ai_api_url: String,
    pub ai_api_key: String,
}

impl Settings {
    pub fn resolve(preferences: &Preferences) -> Self {
        let bible_api_url =
            std::env::var("BIBLE_API_URL").unwrap_or_else(|_| DEFAULT_BIBLE_API_URL.to_string());
        let ai_api_url =
            std::env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_AI_API_URL.to_string());
        let ai_api_key = std::env::var("AI_API_KEY")
            .ok()
            .or_else(|| preferences.ai_api_key.clone())
            .unwrap_or_default();

        Self {
            bible_api_url,
            ai_api_url,
            ai_api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("preferences.json")).unwrap();
        assert_eq!(prefs.version, "gae");
        assert_eq!(prefs.version_name, "개역개정");
        assert_eq!(prefs.language, Language::Korean);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = Preferences {
            version: "kjv".to_string(),
            version_name: "King James Version".to_string(),
            language: Language::English,
            ai_api_key: Some("key-123".to_string()),
        };
        prefs.save_to(&path).unwrap();

        let loaded = Preferences::load_from(&path).unwrap();
        assert_eq!(loaded.version, "kjv");
        assert_eq!(loaded.language, Language::English);
        assert_eq!(loaded.ai_api_key.as_deref(), Some("key-123"));
    }

    #[test]
    fn older_preferences_without_language_still_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"version":"niv","version_name":"NIV"}"#).unwrap();

        let loaded = Preferences::load_from(&path).unwrap();
        assert_eq!(loaded.version, "niv");
        assert_eq!(loaded.language, Language::Korean);
    }
}
