//! Local HTML extraction for the direct fetcher.
//!
//! Keeps the outermost elements whose tag is in the include list (and that do
//! not sit inside an excluded tag), converts them to Markdown with `htmd`,
//! then runs the cleanup passes.

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use sitebrief_shared::{Result, SiteBriefError};

use crate::FetchOptions;
use crate::cleanup;

/// Tags that never carry readable text, dropped whatever the options say.
const ALWAYS_SKIPPED: &[&str] = &["script", "style", "noscript", "svg", "iframe", "template"];

/// Extract readable Markdown from a full HTML document.
pub(crate) fn html_to_markdown(html: &str, opts: &FetchOptions, base: &Url) -> Result<String> {
    let selected = select_included(html, &opts.include_tags, &opts.exclude_tags);

    let skip: Vec<&str> = opts
        .exclude_tags
        .iter()
        .map(String::as_str)
        .chain(ALWAYS_SKIPPED.iter().copied())
        .collect();

    let converter = htmd::HtmlToMarkdown::builder().skip_tags(skip).build();
    let raw = converter
        .convert(&selected)
        .map_err(|e| SiteBriefError::Conversion(format!("htmd conversion failed: {e}")))?;

    debug!(raw_len = raw.len(), "htmd conversion complete");
    Ok(cleanup::run_pipeline(&raw, Some(base)))
}

/// Outer HTML of the top-most included elements, in document order.
///
/// An empty include list keeps the whole document.
fn select_included(html: &str, include: &[String], exclude: &[String]) -> String {
    let doc = Html::parse_document(html);
    if include.is_empty() {
        return doc.root_element().html();
    }

    let mut parts: Vec<String> = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if !tag_in(el.value().name(), include) || tag_in(el.value().name(), exclude) {
            continue;
        }

        let covered = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| tag_in(a.value().name(), include) || tag_in(a.value().name(), exclude));
        if !covered {
            parts.push(el.html());
        }
    }

    parts.join("\n")
}

fn tag_in(name: &str, tags: &[String]) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(name))
}
