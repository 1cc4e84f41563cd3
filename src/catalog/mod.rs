// SPDX-License-Identifier: MPL-2.0
//! Translation catalogs: nested per-language dictionaries and the
//! dot-path key resolver.
//!
//! A [`TranslationTree`] is a recursively nested mapping whose leaves are
//! strings. Keys like `about.mission.title` address a leaf by splitting on
//! `.` and descending one segment at a time. Resolution failure is a
//! signal (`None`), never a fault: missing segments, non-mapping
//! intermediate nodes, and paths ending on a subtree all miss.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

pub mod source;

pub use source::{CatalogProvider, EmbeddedCatalogs, FsCatalogs, RemoteCatalogs};

/// One language's translations as a validated nested tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree(Map<String, Value>);

impl TranslationTree {
    /// Validates that `value` is a JSON object and wraps it.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::Parse(format!(
                "catalog root must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parses a catalog from its JSON source text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Resolves a dot-delimited key to its leaf string.
    ///
    /// Pure function of the tree and the key. Returns `None` when any
    /// segment is absent, an intermediate node is not a mapping, or the
    /// final node is itself a subtree rather than a string.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }

    /// Every dot-delimited path that addresses a string leaf.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (key, value) in &self.0 {
            collect_leaf_paths(key, value, &mut paths);
        }
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn collect_leaf_paths(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(_) => out.push(prefix.to_string()),
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaf_paths(&format!("{prefix}.{key}"), child, out);
            }
        }
        _ => {}
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TranslationTree {
        TranslationTree::from_json(
            r#"{
                "nav": { "home": "HOME", "contact": "CONTATO" },
                "about": { "mission": { "title": "NOSSA MISSÃO" } },
                "count": 3
            }"#,
        )
        .expect("sample catalog should parse")
    }

    #[test]
    fn resolves_top_level_leaf() {
        let tree = sample();
        assert_eq!(tree.resolve("nav.home"), Some("HOME"));
    }

    #[test]
    fn resolves_deeply_nested_leaf() {
        let tree = sample();
        assert_eq!(tree.resolve("about.mission.title"), Some("NOSSA MISSÃO"));
    }

    #[test]
    fn missing_segment_is_a_miss() {
        let tree = sample();
        assert_eq!(tree.resolve("nav.missing"), None);
        assert_eq!(tree.resolve("absent.entirely"), None);
    }

    #[test]
    fn path_ending_on_a_subtree_is_a_miss() {
        let tree = sample();
        assert_eq!(tree.resolve("nav"), None);
        assert_eq!(tree.resolve("about.mission"), None);
    }

    #[test]
    fn descending_through_a_leaf_is_a_miss() {
        let tree = sample();
        assert_eq!(tree.resolve("nav.home.too.deep"), None);
    }

    #[test]
    fn non_string_leaf_is_a_miss() {
        let tree = sample();
        assert_eq!(tree.resolve("count"), None);
    }

    #[test]
    fn empty_key_is_a_miss() {
        let tree = sample();
        assert_eq!(tree.resolve(""), None);
    }

    #[test]
    fn every_leaf_path_round_trips() {
        let tree = sample();
        let paths = tree.leaf_paths();
        assert!(paths.contains(&"about.mission.title".to_string()));
        for path in paths {
            assert!(tree.resolve(&path).is_some(), "path {path} should resolve");
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(TranslationTree::from_json("[1, 2]").is_err());
        assert!(TranslationTree::from_json("\"just a string\"").is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(TranslationTree::from_json("{ nav: ").is_err());
    }
}
