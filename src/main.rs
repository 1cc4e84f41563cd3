// SPDX-License-Identifier: MPL-2.0
//! Offline page localizer: applies a language's catalog to a markup file
//! and writes the localized result.

use lingora::catalog::CatalogProvider;
use lingora::{
    ChangeOutcome, Document, EmbeddedCatalogs, EngineConfig, Error, FileStore, FsCatalogs,
    TranslationEngine,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: lingora [--lang CODE] [--locales DIR] [--out FILE] PAGE

Applies translations to PAGE's data-i18n bindings.

Options:
  --lang CODE     Language to apply (default: stored selection, then pt)
  --locales DIR   Read catalogs from DIR/<lang>.json instead of the
                  embedded ones
  --out FILE      Write the localized page to FILE instead of stdout
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> lingora::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{USAGE}");
        return Ok(());
    }

    let lang: Option<String> = args
        .opt_value_from_str("--lang")
        .map_err(|e| Error::Config(e.to_string()))?;
    let locales: Option<PathBuf> = args
        .opt_value_from_str("--locales")
        .map_err(|e| Error::Config(e.to_string()))?;
    let out: Option<PathBuf> = args
        .opt_value_from_str("--out")
        .map_err(|e| Error::Config(e.to_string()))?;
    let input = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok())
        .ok_or_else(|| Error::Config("missing input page (see --help)".to_string()))?;

    match locales {
        Some(dir) => localize(FsCatalogs::new(dir), lang, &input, out).await,
        None => localize(EmbeddedCatalogs::new(), lang, &input, out).await,
    }
}

async fn localize<P: CatalogProvider>(
    provider: P,
    lang: Option<String>,
    input: &str,
    out: Option<PathBuf>,
) -> lingora::Result<()> {
    let engine = TranslationEngine::new(EngineConfig::default(), provider, FileStore::new()?)?;
    let page = std::fs::read_to_string(input)?;
    engine.attach_document(Document::parse(&page)?);

    match lang {
        Some(code) => {
            // A request for the already-selected language is a no-op for
            // the engine but the page still needs its initial render.
            if engine.change_language(&code).await? == ChangeOutcome::NoOp {
                engine.apply_current().await?;
            }
        }
        None => {
            engine.apply_current().await?;
        }
    }

    let html = engine.render();
    match out {
        Some(path) => std::fs::write(path, html)?,
        None => print!("{html}"),
    }
    Ok(())
}
