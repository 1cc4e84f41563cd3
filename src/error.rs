// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    /// Markup could not be parsed into a document tree.
    Parse(String),
    /// A language code outside the configured available set was requested.
    InvalidLanguage(String),
    /// A non-default language's catalog could not be loaded. Recoverable:
    /// the engine falls back to the default language.
    CatalogUnavailable { language: String, reason: String },
    /// The default language's catalog itself could not be loaded. There is
    /// no safe fallback; the document is left untouched.
    DefaultCatalogUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Parse(e) => write!(f, "Parse Error: {}", e),
            Error::InvalidLanguage(code) => write!(f, "Invalid language code: {}", code),
            Error::CatalogUnavailable { language, reason } => {
                write!(f, "Catalog unavailable for '{}': {}", language, reason)
            }
            Error::DefaultCatalogUnavailable(reason) => {
                write!(f, "Default catalog unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn invalid_language_names_the_code() {
        let err = Error::InvalidLanguage("xx".into());
        assert_eq!(format!("{}", err), "Invalid language code: xx");
    }

    #[test]
    fn catalog_unavailable_names_language_and_reason() {
        let err = Error::CatalogUnavailable {
            language: "es".into(),
            reason: "404".into(),
        };
        let text = format!("{}", err);
        assert!(text.contains("es"));
        assert!(text.contains("404"));
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }
}
