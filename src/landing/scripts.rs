//! Script extraction from landing page HTML.

use std::sync::LazyLock;

use log::{debug, error};
use scraper::{Html, Selector};
use url::Url;

use super::ScriptRef;

const SCRIPT_SELECTOR_STR: &str = "script[src]";

static SCRIPT_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse(SCRIPT_SELECTOR_STR)
        .map_err(|e| error!("Failed to parse CSS selector '{SCRIPT_SELECTOR_STR}': {e}"))
        .ok()
});

/// Extracts every `<script src>` of `html`, resolving sources against `page`.
///
/// Sources that do not form a valid URL are skipped. Duplicates are kept once,
/// in document order.
pub fn extract_scripts(page: &Url, html: &str) -> Vec<ScriptRef> {
    let Some(selector) = SCRIPT_SELECTOR.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut scripts: Vec<ScriptRef> = Vec::new();
    for element in document.select(selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        let src = match page.join(src.trim()) {
            Ok(src) => src,
            Err(e) => {
                debug!("Skipping script source '{src}' of {page}: {e}");
                continue;
            }
        };
        let script = ScriptRef {
            src,
            integrity: element.value().attr("integrity").map(str::to_string),
        };
        if !scripts.contains(&script) {
            scripts.push(script);
        }
    }
    scripts
}
