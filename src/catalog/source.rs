// SPDX-License-Identifier: MPL-2.0
//! Catalog acquisition.
//!
//! Whether catalogs are compiled into the binary, read from a directory,
//! or fetched over HTTP is a construction-time choice of provider, not a
//! different engine code path. All providers are idempotent: repeated
//! loads return equal trees and mutate nothing.

use super::TranslationTree;
use crate::error::{Error, Result};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::path::PathBuf;
use unic_langid::LanguageIdentifier;

/// Source of per-language [`TranslationTree`]s.
///
/// `load` may suspend (network or file I/O); callers must not apply a
/// half-loaded tree and are responsible for checking that the selection
/// they loaded for is still current once the load completes.
#[allow(async_fn_in_trait)]
pub trait CatalogProvider {
    async fn load(&self, language: &LanguageIdentifier) -> Result<TranslationTree>;
}

#[derive(RustEmbed)]
#[folder = "assets/locales/"]
struct Asset;

/// Catalogs compiled into the binary from `assets/locales/*.json`.
///
/// All assets are parsed once at construction; `load` is a lookup.
pub struct EmbeddedCatalogs {
    catalogs: HashMap<LanguageIdentifier, TranslationTree>,
    pub available_locales: Vec<LanguageIdentifier>,
}

impl Default for EmbeddedCatalogs {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedCatalogs {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        let mut available_locales = Vec::new();

        for file in Asset::iter() {
            let filename = file.as_ref();
            if let Some(locale_str) = filename.strip_suffix(".json") {
                if let Ok(locale) = locale_str.parse::<LanguageIdentifier>() {
                    if let Some(content) = Asset::get(filename) {
                        let text = String::from_utf8_lossy(content.data.as_ref());
                        // Embedded assets are developer-maintained; a parse
                        // failure here is a build defect.
                        let tree = TranslationTree::from_json(&text)
                            .expect("Failed to parse embedded catalog.");
                        catalogs.insert(locale.clone(), tree);
                        available_locales.push(locale);
                    }
                }
            }
        }

        Self {
            catalogs,
            available_locales,
        }
    }
}

impl CatalogProvider for EmbeddedCatalogs {
    async fn load(&self, language: &LanguageIdentifier) -> Result<TranslationTree> {
        self.catalogs
            .get(language)
            .cloned()
            .ok_or_else(|| Error::CatalogUnavailable {
                language: language.to_string(),
                reason: "no embedded catalog".to_string(),
            })
    }
}

/// Catalogs read from `<dir>/<lang>.json` on each load.
pub struct FsCatalogs {
    dir: PathBuf,
}

impl FsCatalogs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CatalogProvider for FsCatalogs {
    async fn load(&self, language: &LanguageIdentifier) -> Result<TranslationTree> {
        let path = self.dir.join(format!("{language}.json"));
        let text = std::fs::read_to_string(&path).map_err(|e| Error::CatalogUnavailable {
            language: language.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        TranslationTree::from_json(&text).map_err(|e| Error::CatalogUnavailable {
            language: language.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Catalogs fetched from `<base>/<lang>/translations.json`.
pub struct RemoteCatalogs {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteCatalogs {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl CatalogProvider for RemoteCatalogs {
    async fn load(&self, language: &LanguageIdentifier) -> Result<TranslationTree> {
        let url = format!(
            "{}/{}/translations.json",
            self.base_url.trim_end_matches('/'),
            language
        );
        let unavailable = |reason: String| Error::CatalogUnavailable {
            language: language.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        TranslationTree::from_value(value).map_err(|e| unavailable(e.to_string()))
    }
}
