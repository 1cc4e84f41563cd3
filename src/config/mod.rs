//! Engine configuration, including loading and saving to a TOML file.
//!
//! The engine takes a fully-formed [`EngineConfig`] at construction; the
//! file helpers exist for embedders (such as the bundled CLI) that keep the
//! configuration on disk next to other preferences.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

pub use defaults::{DEFAULT_LANGUAGE, STORAGE_KEY};

const CONFIG_FILE: &str = "engine.toml";
const APP_NAME: &str = "Lingora";

/// One entry of the available-languages set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    /// Language code, e.g. `pt`.
    pub code: String,
    /// Short label shown on the active-language indicator, e.g. `PT`.
    pub label: String,
    /// Human-readable name, e.g. `Português`.
    pub name: String,
}

/// What to do with a binding point whose key does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingKeyPolicy {
    /// Substitute the literal key so the miss is visible and no stale
    /// previous-language text survives a switch.
    #[default]
    ShowKey,
    /// Leave whatever content the binding point already has.
    KeepExisting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fallback language; its catalog must always be loadable.
    pub default_language: String,
    /// The advertised available-languages set.
    pub languages: Vec<LanguageOption>,
    /// Preference-store key holding the selected code.
    pub storage_key: String,
    /// Element id of the active-language indicator node, if the document
    /// has one.
    pub indicator_id: Option<String>,
    #[serde(default)]
    pub missing_key_policy: MissingKeyPolicy,
    /// Consult the OS locale when no stored selection exists.
    #[serde(default)]
    pub detect_system_locale: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: defaults::DEFAULT_LANGUAGE.to_string(),
            languages: defaults::DEFAULT_LANGUAGES
                .iter()
                .map(|(code, label, name)| LanguageOption {
                    code: (*code).to_string(),
                    label: (*label).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
            storage_key: defaults::STORAGE_KEY.to_string(),
            indicator_id: Some(defaults::INDICATOR_ID.to_string()),
            missing_key_policy: MissingKeyPolicy::default(),
            detect_system_locale: false,
        }
    }
}

impl EngineConfig {
    /// Whether `code` is a member of the configured available set.
    pub fn is_available(&self, code: &str) -> bool {
        self.languages.iter().any(|l| l.code == code)
    }

    /// Indicator label for `code`, falling back to the uppercased code.
    pub fn label_for(&self, code: &str) -> String {
        self.languages
            .iter()
            .find(|l| l.code == code)
            .map(|l| l.label.clone())
            .unwrap_or_else(|| code.to_uppercase())
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<EngineConfig> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(EngineConfig::default())
}

pub fn save(config: &EngineConfig) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &EngineConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_languages() {
        let mut config = EngineConfig::default();
        config.default_language = "en".to_string();
        config.detect_system_locale = true;
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("engine.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded.default_language, "en");
        assert_eq!(loaded.languages.len(), config.languages.len());
        assert!(loaded.detect_system_locale);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("engine.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded.default_language, defaults::DEFAULT_LANGUAGE);
    }

    #[test]
    fn default_config_advertises_three_languages() {
        let config = EngineConfig::default();
        assert_eq!(config.languages.len(), 3);
        assert!(config.is_available("pt"));
        assert!(config.is_available("en"));
        assert!(config.is_available("es"));
        assert!(!config.is_available("fr"));
    }

    #[test]
    fn label_for_unknown_code_uppercases_the_code() {
        let config = EngineConfig::default();
        assert_eq!(config.label_for("es"), "ES");
        assert_eq!(config.label_for("zz"), "ZZ");
    }

    #[test]
    fn missing_key_policy_defaults_to_show_key() {
        assert_eq!(MissingKeyPolicy::default(), MissingKeyPolicy::ShowKey);
    }
}
