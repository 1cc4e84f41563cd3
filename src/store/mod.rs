// SPDX-License-Identifier: MPL-2.0
//! Client-scoped key-value persistence for the language selection.
//!
//! One named key holds the raw language code. Reads of absent or
//! unparseable state are not errors; write failures are surfaced as
//! `Err` so the engine can degrade to session-only memory state.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

const STORE_FILE: &str = "preferences.toml";
const APP_NAME: &str = "Lingora";

/// Preferences persisted as a flat TOML table on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store under the platform config directory.
    pub fn new() -> Result<Self> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| Error::Io("no config directory available".to_string()))?;
        path.push(APP_NAME);
        path.push(STORE_FILE);
        Ok(Self { path })
    }

    /// Store at an explicit path (tests, embedders with their own layout).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> toml::Table {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return toml::Table::new();
        };
        content.parse().unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_table()
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut table = self.read_table();
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(&table)?)?;
        Ok(())
    }
}

/// In-memory store for tests and degraded sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
