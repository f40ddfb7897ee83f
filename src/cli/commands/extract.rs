//! Extract command: run the URL extractor without a server or database.

use crate::config::Settings;
use crate::origins::UrlExtractor;

/// Print one JSON line per `{url, origin}` pair found in `text`.
pub fn cmd_extract(settings: &Settings, text: &[String]) -> anyhow::Result<()> {
    let extractor = UrlExtractor::new(settings.load_catalog()?);
    let pairs = extractor.extract_all(&text.join(" "))?;

    for pair in &pairs {
        println!("{}", serde_json::to_string(pair)?);
    }
    Ok(())
}
