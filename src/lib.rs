// SPDX-License-Identifier: MPL-2.0
//! `lingora` is a declarative translation engine for attribute-bound
//! markup documents.
//!
//! It keeps nested per-language catalogs, resolves dot-separated keys
//! against them, and applies resolved strings to binding points declared
//! with `data-i18n`, `data-i18n-html` and `data-i18n-attr` attributes. The
//! selected language is persisted across sessions and changes are
//! broadcast to registered listeners.

#![doc(html_root_url = "https://docs.rs/lingora/0.2.0")]

pub mod catalog;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod store;

pub use catalog::{CatalogProvider, EmbeddedCatalogs, FsCatalogs, RemoteCatalogs, TranslationTree};
pub use config::{EngineConfig, LanguageOption, MissingKeyPolicy};
pub use document::Document;
pub use engine::{ApplyStats, ChangeOutcome, LanguageChanged, TranslationEngine};
pub use error::{Error, Result};
pub use store::{FileStore, MemoryStore, PreferenceStore};
