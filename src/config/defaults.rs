// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for the engine configuration.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Languages**: default language and the built-in available set
//! - **Persistence**: the preference-store key holding the selection
//! - **Document**: well-known keys and selectors consumed during application

// ==========================================================================
// Language Defaults
// ==========================================================================

/// Language used when no stored or detected selection applies.
pub const DEFAULT_LANGUAGE: &str = "pt";

/// Built-in available languages: `(code, indicator label, display name)`.
pub const DEFAULT_LANGUAGES: [(&str, &str, &str); 3] = [
    ("pt", "PT", "Português"),
    ("en", "EN", "English"),
    ("es", "ES", "Español"),
];

// ==========================================================================
// Persistence Defaults
// ==========================================================================

/// Preference-store key under which the selected language code is kept.
pub const STORAGE_KEY: &str = "precision-language";

// ==========================================================================
// Document Defaults
// ==========================================================================

/// Element id of the active-language indicator node, when present.
pub const INDICATOR_ID: &str = "lang-toggle";

/// Well-known key for the document title.
pub const META_TITLE_KEY: &str = "meta.title";

/// Well-known key for the description metadata field.
pub const META_DESCRIPTION_KEY: &str = "meta.description";

/// Well-known key for the keywords metadata field.
pub const META_KEYWORDS_KEY: &str = "meta.keywords";

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(!DEFAULT_LANGUAGE.is_empty());
    assert!(!STORAGE_KEY.is_empty());
    assert!(!DEFAULT_LANGUAGES.is_empty());
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_a_member_of_the_available_set() {
        assert!(DEFAULT_LANGUAGES
            .iter()
            .any(|(code, _, _)| *code == DEFAULT_LANGUAGE));
    }

    #[test]
    fn language_codes_are_unique() {
        for (i, (a, _, _)) in DEFAULT_LANGUAGES.iter().enumerate() {
            for (b, _, _) in &DEFAULT_LANGUAGES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn meta_keys_live_under_the_meta_section() {
        assert!(META_TITLE_KEY.starts_with("meta."));
        assert!(META_DESCRIPTION_KEY.starts_with("meta."));
        assert!(META_KEYWORDS_KEY.starts_with("meta."));
    }
}
