// SPDX-License-Identifier: MPL-2.0
//! The translation engine: selection state, catalog fallback, document
//! application, persistence and change notification.
//!
//! One explicitly-constructed [`TranslationEngine`] replaces the ambient
//! globals of a typical page-script i18n setup. All operations run on a
//! single cooperative executor; the only suspension point is catalog
//! acquisition. Selection state is written synchronously before that
//! suspension, and a generation counter lets a stale in-flight load detect
//! that a newer change superseded it and abandon application, so the final
//! requested language always wins when changes race.

use crate::catalog::{CatalogProvider, TranslationTree};
use crate::config::defaults::{META_DESCRIPTION_KEY, META_KEYWORDS_KEY, META_TITLE_KEY};
use crate::config::{EngineConfig, MissingKeyPolicy};
use crate::document::{Binding, BindingKind, Document, LanguageTrigger};
use crate::error::{Error, Result};
use crate::store::PreferenceStore;
use std::sync::{Mutex, MutexGuard};
use unic_langid::LanguageIdentifier;

/// Broadcast to listeners after a completed language change.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageChanged {
    pub previous: LanguageIdentifier,
    pub current: LanguageIdentifier,
}

/// Per-application diagnostics: how many binding points were translated
/// and how many keys missed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub applied: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    Changed {
        previous: LanguageIdentifier,
        current: LanguageIdentifier,
        stats: ApplyStats,
    },
    /// The requested language already was the selection; no notification,
    /// no persistence write.
    NoOp,
    /// A newer change overtook this one while its catalog was loading; the
    /// document was left to the winner.
    Superseded,
}

struct Selection {
    current: LanguageIdentifier,
    generation: u64,
}

type Listener = Box<dyn Fn(&LanguageChanged) + Send>;

pub struct TranslationEngine<P, S> {
    config: EngineConfig,
    provider: P,
    store: S,
    default_language: LanguageIdentifier,
    selection: Mutex<Selection>,
    document: Mutex<Document>,
    listeners: Mutex<Vec<Listener>>,
}

impl<P: CatalogProvider, S: PreferenceStore> TranslationEngine<P, S> {
    /// Builds an engine with the starting selection resolved from the
    /// store, the OS locale (when enabled), or the configured default.
    pub fn new(config: EngineConfig, provider: P, store: S) -> Result<Self> {
        let default_language: LanguageIdentifier = config
            .default_language
            .parse()
            .map_err(|_| Error::Config(format!("invalid default language: {}", config.default_language)))?;
        if !config.is_available(&config.default_language) {
            return Err(Error::Config(format!(
                "default language '{}' is not in the available set",
                config.default_language
            )));
        }

        let current = initial_language(&config, &store, &default_language);
        Ok(Self {
            config,
            provider,
            store,
            default_language,
            selection: Mutex::new(Selection {
                current,
                generation: 0,
            }),
            document: Mutex::new(Document::default()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_language(&self) -> LanguageIdentifier {
        self.selection().current.clone()
    }

    /// The raw code in the preference store, if any.
    pub fn stored_language(&self) -> Option<String> {
        self.store.get(&self.config.storage_key)
    }

    /// Replaces the engine's document. The previous document is returned
    /// so embedders can swap pages.
    pub fn attach_document(&self, document: Document) -> Document {
        std::mem::replace(&mut *self.doc(), document)
    }

    pub fn render(&self) -> String {
        self.doc().to_html()
    }

    /// Language-selection trigger elements (`data-lang`) of the attached
    /// document, for embedding UI to wire up.
    pub fn language_triggers(&self) -> Vec<LanguageTrigger> {
        self.doc().triggers().to_vec()
    }

    /// Registers a change listener. Listeners see every completed change,
    /// never no-ops or superseded loads.
    pub fn on_change(&self, listener: impl Fn(&LanguageChanged) + Send + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(listener));
    }

    /// Loads the catalog for `language`, falling back to the default
    /// language's catalog when the requested one is unavailable.
    ///
    /// Safe to call repeatedly; performs no mutation beyond returning data.
    /// A failure to load the default catalog itself is fatal.
    pub async fn load_catalog_for(&self, language: &LanguageIdentifier) -> Result<TranslationTree> {
        Ok(self.load_with_fallback(language).await?.0)
    }

    async fn load_with_fallback(
        &self,
        language: &LanguageIdentifier,
    ) -> Result<(TranslationTree, LanguageIdentifier)> {
        match self.provider.load(language).await {
            Ok(tree) => Ok((tree, language.clone())),
            Err(err) if *language == self.default_language => {
                Err(Error::DefaultCatalogUnavailable(err.to_string()))
            }
            Err(err) => {
                tracing::warn!(language = %language, error = %err, "catalog load failed, falling back to default");
                let tree = self
                    .provider
                    .load(&self.default_language)
                    .await
                    .map_err(|e| Error::DefaultCatalogUnavailable(e.to_string()))?;
                Ok((tree, self.default_language.clone()))
            }
        }
    }

    /// Loads and applies the catalog for the current selection. Used for
    /// the initial render.
    pub async fn apply_current(&self) -> Result<ApplyStats> {
        let (language, generation) = {
            let sel = self.selection();
            (sel.current.clone(), sel.generation)
        };
        let (tree, effective) = self.load_with_fallback(&language).await?;
        if self.selection().generation != generation {
            tracing::debug!(language = %language, "initial render superseded by a language change");
            return Ok(ApplyStats::default());
        }
        Ok(self.apply_tree(&tree, &effective))
    }

    /// The sole mutator of the selection state.
    pub async fn change_language(&self, code: &str) -> Result<ChangeOutcome> {
        if !self.config.is_available(code) {
            return Err(Error::InvalidLanguage(code.to_string()));
        }
        let requested: LanguageIdentifier = code
            .parse()
            .map_err(|_| Error::InvalidLanguage(code.to_string()))?;

        // Selection is written synchronously, before the load suspends, so
        // the last call in program order owns the newest generation.
        let (previous, generation) = {
            let mut sel = self.selection();
            if sel.current == requested {
                return Ok(ChangeOutcome::NoOp);
            }
            let previous = std::mem::replace(&mut sel.current, requested.clone());
            sel.generation += 1;
            (previous, sel.generation)
        };

        // Storage failures degrade to session-only state, never surface.
        if let Err(err) = self.store.set(&self.config.storage_key, code) {
            tracing::warn!(error = %err, "failed to persist language selection");
        }

        let (tree, effective) = self.load_with_fallback(&requested).await?;

        if self.selection().generation != generation {
            tracing::debug!(language = %requested, "stale catalog load superseded by a newer change");
            return Ok(ChangeOutcome::Superseded);
        }

        let stats = self.apply_tree(&tree, &effective);

        let event = LanguageChanged {
            previous,
            current: requested,
        };
        for listener in self.listeners.lock().unwrap_or_else(|e| e.into_inner()).iter() {
            listener(&event);
        }
        Ok(ChangeOutcome::Changed {
            previous: event.previous,
            current: event.current,
            stats,
        })
    }

    fn apply_tree(&self, tree: &TranslationTree, language: &LanguageIdentifier) -> ApplyStats {
        let mut doc = self.doc();
        let mut stats = ApplyStats::default();

        let bindings = doc.bindings().to_vec();
        for binding in &bindings {
            let key = binding.kind.key();
            let Some(value) = tree.resolve(key) else {
                self.handle_missing(&mut doc, binding, key, &mut stats);
                continue;
            };
            // A text or markup binding earlier in the pass can replace the
            // subtree holding this element.
            let Some(el) = doc.element_at_mut(&binding.path) else {
                stats.missing += 1;
                tracing::warn!(key, "binding point no longer present in document");
                continue;
            };
            match &binding.kind {
                BindingKind::Text { .. } => {
                    if el.is_form_input() {
                        el.set_attr("placeholder", value);
                    } else {
                        el.set_text(value);
                    }
                }
                BindingKind::Markup { .. } => el.set_raw_inner(value),
                BindingKind::Attribute { attr, .. } => el.set_attr(attr, value),
            }
            stats.applied += 1;
        }

        if let Some(title) = tree.resolve(META_TITLE_KEY) {
            doc.set_title(title);
        }
        if let Some(description) = tree.resolve(META_DESCRIPTION_KEY) {
            doc.set_meta_content("description", description);
        }
        if let Some(keywords) = tree.resolve(META_KEYWORDS_KEY) {
            doc.set_meta_content("keywords", keywords);
        }
        let code = language.to_string();
        doc.set_lang(&code);

        if let Some(id) = &self.config.indicator_id {
            if let Some(el) = doc.element_by_id_mut(id) {
                el.set_text(&self.config.label_for(&code));
            }
        }

        tracing::debug!(
            language = %language,
            applied = stats.applied,
            missing = stats.missing,
            "applied catalog to document"
        );
        stats
    }

    fn handle_missing(
        &self,
        doc: &mut Document,
        binding: &Binding,
        key: &str,
        stats: &mut ApplyStats,
    ) {
        stats.missing += 1;
        tracing::warn!(key, "translation not found");
        if self.config.missing_key_policy == MissingKeyPolicy::KeepExisting {
            return;
        }
        let Some(el) = doc.element_at_mut(&binding.path) else {
            return;
        };
        match &binding.kind {
            BindingKind::Attribute { attr, .. } => el.set_attr(attr, key),
            _ if el.is_form_input() => el.set_attr("placeholder", key),
            _ => el.set_text(key),
        }
    }

    fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn initial_language<S: PreferenceStore>(
    config: &EngineConfig,
    store: &S,
    default_language: &LanguageIdentifier,
) -> LanguageIdentifier {
    // 1. Stored selection, when still a member of the available set.
    if let Some(code) = store.get(&config.storage_key) {
        if config.is_available(&code) {
            if let Ok(stored) = code.parse::<LanguageIdentifier>() {
                return stored;
            }
        }
    }

    // 2. OS locale, matched on the primary language subtag.
    if config.detect_system_locale {
        if let Some(os_locale) = sys_locale::get_locale() {
            if let Ok(os_lang) = os_locale.parse::<LanguageIdentifier>() {
                for option in &config.languages {
                    if let Ok(lang) = option.code.parse::<LanguageIdentifier>() {
                        if lang.language == os_lang.language {
                            return lang;
                        }
                    }
                }
            }
        }
    }

    // 3. Configured default.
    default_language.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticCatalogs {
        trees: HashMap<String, TranslationTree>,
    }

    impl StaticCatalogs {
        fn new(entries: &[(&str, &str)]) -> Self {
            let trees = entries
                .iter()
                .map(|(code, json)| {
                    let tree = TranslationTree::from_json(json).expect("test catalog");
                    ((*code).to_string(), tree)
                })
                .collect();
            Self { trees }
        }
    }

    impl CatalogProvider for StaticCatalogs {
        async fn load(&self, language: &LanguageIdentifier) -> Result<TranslationTree> {
            self.trees
                .get(&language.to_string())
                .cloned()
                .ok_or_else(|| Error::CatalogUnavailable {
                    language: language.to_string(),
                    reason: "not configured".to_string(),
                })
        }
    }

    fn catalogs() -> StaticCatalogs {
        StaticCatalogs::new(&[
            ("pt", r#"{ "nav": { "home": "HOME" }, "meta": { "title": "Título" } }"#),
            ("en", r#"{ "nav": { "home": "HOME" }, "meta": { "title": "Title" } }"#),
            ("es", r#"{ "nav": { "home": "INICIO" }, "meta": { "title": "Título ES" } }"#),
        ])
    }

    fn engine() -> TranslationEngine<StaticCatalogs, MemoryStore> {
        TranslationEngine::new(EngineConfig::default(), catalogs(), MemoryStore::new())
            .expect("engine construction")
    }

    fn page() -> Document {
        Document::parse(
            r#"<html lang="pt"><head><title>Old</title></head><body><a data-i18n="nav.home">HOME</a><span id="lang-toggle">PT</span></body></html>"#,
        )
        .expect("page parse")
    }

    #[test]
    fn starts_at_default_without_stored_state() {
        let engine = engine();
        assert_eq!(engine.current_language().to_string(), "pt");
    }

    #[test]
    fn starts_at_stored_language_when_valid() {
        let store = MemoryStore::new();
        store.set("precision-language", "es").expect("seed store");
        let engine = TranslationEngine::new(EngineConfig::default(), catalogs(), store)
            .expect("engine construction");
        assert_eq!(engine.current_language().to_string(), "es");
    }

    #[test]
    fn stored_language_outside_the_set_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set("precision-language", "de").expect("seed store");
        let engine = TranslationEngine::new(EngineConfig::default(), catalogs(), store)
            .expect("engine construction");
        assert_eq!(engine.current_language().to_string(), "pt");
    }

    #[test]
    fn default_language_must_be_in_the_available_set() {
        let mut config = EngineConfig::default();
        config.default_language = "fr".to_string();
        let result = TranslationEngine::new(config, catalogs(), MemoryStore::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn change_language_translates_bound_elements() {
        let engine = engine();
        engine.attach_document(page());
        let outcome = engine.change_language("es").await.expect("change");
        match outcome {
            ChangeOutcome::Changed { previous, current, stats } => {
                assert_eq!(previous.to_string(), "pt");
                assert_eq!(current.to_string(), "es");
                assert_eq!(stats.applied, 1);
                assert_eq!(stats.missing, 0);
            }
            other => panic!("expected Changed, got {other:?}"),
        }
        let html = engine.render();
        assert!(html.contains(">INICIO<"));
        assert!(html.contains("<title>Título ES</title>"));
        assert!(html.contains(r#"lang="es""#));
    }

    #[tokio::test]
    async fn change_language_updates_the_indicator_node() {
        let engine = engine();
        engine.attach_document(page());
        engine.change_language("en").await.expect("change");
        assert!(engine.render().contains(r#"<span id="lang-toggle">EN</span>"#));
    }

    #[tokio::test]
    async fn change_language_persists_the_selection() {
        let engine = engine();
        engine.attach_document(page());
        engine.change_language("es").await.expect("change");
        assert_eq!(engine.stored_language().as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn no_op_change_neither_notifies_nor_persists() {
        let engine = engine();
        engine.attach_document(page());
        let notified = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&notified);
        engine.on_change(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = engine.change_language("pt").await.expect("no-op change");
        assert_eq!(outcome, ChangeOutcome::NoOp);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert_eq!(engine.stored_language(), None);
    }

    #[tokio::test]
    async fn invalid_language_is_rejected_and_state_unchanged() {
        let engine = engine();
        engine.attach_document(page());
        let result = engine.change_language("de").await;
        assert!(matches!(result, Err(Error::InvalidLanguage(code)) if code == "de"));
        assert_eq!(engine.current_language().to_string(), "pt");
        assert_eq!(engine.stored_language(), None);
    }

    #[tokio::test]
    async fn listeners_receive_previous_and_current() {
        let engine = engine();
        engine.attach_document(page());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.on_change(move |event| {
            sink.lock().expect("event sink").push(event.clone());
        });

        engine.change_language("en").await.expect("change");
        engine.change_language("es").await.expect("change");

        let events = events.lock().expect("event sink");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].previous.to_string(), "pt");
        assert_eq!(events[0].current.to_string(), "en");
        assert_eq!(events[1].previous.to_string(), "en");
        assert_eq!(events[1].current.to_string(), "es");
    }

    #[tokio::test]
    async fn unavailable_catalog_falls_back_to_default_tree() {
        // 'en' is advertised but has no catalog; loads must fall back.
        let provider = StaticCatalogs::new(&[(
            "pt",
            r#"{ "nav": { "home": "HOME PT" } }"#,
        )]);
        let engine = TranslationEngine::new(EngineConfig::default(), provider, MemoryStore::new())
            .expect("engine construction");

        let en: LanguageIdentifier = "en".parse().expect("code");
        let pt: LanguageIdentifier = "pt".parse().expect("code");
        let fallback = engine.load_catalog_for(&en).await.expect("fallback load");
        let default = engine.load_catalog_for(&pt).await.expect("default load");
        assert_eq!(fallback, default);
    }

    #[tokio::test]
    async fn missing_default_catalog_is_fatal_and_leaves_document_untouched() {
        let provider = StaticCatalogs::new(&[]);
        let engine = TranslationEngine::new(EngineConfig::default(), provider, MemoryStore::new())
            .expect("engine construction");
        engine.attach_document(page());
        let before = engine.render();

        let result = engine.change_language("es").await;
        assert!(matches!(result, Err(Error::DefaultCatalogUnavailable(_))));
        assert_eq!(engine.render(), before);
    }

    #[tokio::test]
    async fn missing_key_shows_the_literal_key_by_default() {
        let engine = engine();
        engine.attach_document(
            Document::parse(r#"<p data-i18n="nav.absent">old text</p>"#).expect("page"),
        );
        let outcome = engine.change_language("es").await.expect("change");
        match outcome {
            ChangeOutcome::Changed { stats, .. } => assert_eq!(stats.missing, 1),
            other => panic!("expected Changed, got {other:?}"),
        }
        assert!(engine.render().contains(">nav.absent<"));
    }

    #[tokio::test]
    async fn keep_existing_policy_leaves_prior_content() {
        let mut config = EngineConfig::default();
        config.missing_key_policy = MissingKeyPolicy::KeepExisting;
        let engine = TranslationEngine::new(config, catalogs(), MemoryStore::new())
            .expect("engine construction");
        engine.attach_document(
            Document::parse(r#"<p data-i18n="nav.absent">old text</p>"#).expect("page"),
        );
        engine.change_language("es").await.expect("change");
        assert!(engine.render().contains(">old text<"));
    }

    #[tokio::test]
    async fn form_inputs_get_placeholder_not_content() {
        let engine = engine();
        engine.attach_document(
            Document::parse(r#"<input type="text" data-i18n="nav.home" placeholder="x">"#)
                .expect("page"),
        );
        engine.change_language("es").await.expect("change");
        let html = engine.render();
        assert!(html.contains(r#"placeholder="INICIO""#));
        assert!(!html.contains(">INICIO<"));
    }

    #[tokio::test]
    async fn apply_current_renders_the_starting_language() {
        let engine = engine();
        engine.attach_document(page());
        let stats = engine.apply_current().await.expect("initial render");
        assert_eq!(stats.applied, 1);
        assert!(engine.render().contains("<title>Título</title>"));
    }

    #[tokio::test]
    async fn destroyed_nested_binding_counts_as_missing() {
        let provider = StaticCatalogs::new(&[(
            "es",
            r#"{ "nav": { "home": "INICIO", "about": "NOSOTROS" } }"#,
        )]);
        let engine = TranslationEngine::new(EngineConfig::default(), provider, MemoryStore::new())
            .expect("engine construction");
        // Applying the outer text binding replaces the subtree that holds
        // the inner one.
        engine.attach_document(
            Document::parse(
                r#"<div data-i18n="nav.home"><span data-i18n="nav.about">x</span></div>"#,
            )
            .expect("page"),
        );
        match engine.change_language("es").await.expect("change") {
            ChangeOutcome::Changed { stats, .. } => {
                assert_eq!(stats.applied, 1);
                assert_eq!(stats.missing, 1);
            }
            other => panic!("expected Changed, got {other:?}"),
        }
        assert!(engine.render().contains(">INICIO<"));
    }

    #[tokio::test]
    async fn triggers_are_exposed_for_embedding_ui() {
        let engine = engine();
        engine.attach_document(
            Document::parse(r#"<button data-lang="es">ES</button>"#).expect("page"),
        );
        let triggers = engine.language_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].code, "es");
    }
}
