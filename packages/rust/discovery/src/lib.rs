//! Blog page discovery.
//!
//! After the main page of a site is scraped, SiteBrief scans its text for
//! links that look like they lead to a blog. Candidates are collected by a
//! few ordered pattern rules; if none match, well-known section paths are
//! guessed instead. Only the first candidate is ever fetched, so order
//! matters more than completeness.

mod rules;

use sitebrief_shared::{Result, SiteBriefError};
use tracing::{debug, instrument};
use url::Url;

/// Paths tried, in order, when the page text has no blog-like links.
pub const FALLBACK_PATHS: [&str; 4] = ["/blog", "/news", "/articles", "/posts"];

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Find candidate blog URLs in scraped page text.
///
/// Rules run in order (Markdown link text, `href` attributes, bare URLs);
/// relative candidates are resolved against the origin of `base`. The
/// result is de-duplicated with first-occurrence order preserved and is
/// never empty.
#[instrument(skip_all, fields(base = %base))]
pub fn locate_blog_urls(base: &Url, content: &str) -> Result<Vec<String>> {
    let origin = origin_url(base)?;
    let mut urls: Vec<String> = Vec::new();

    for raw in rules::candidates(content) {
        let Some(url) = resolve_candidate(base, &origin, &raw) else {
            continue;
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    if urls.is_empty() {
        debug!("no blog links found, guessing common section paths");
        return Ok(FALLBACK_PATHS
            .iter()
            .map(|path| format!("{origin}{path}"))
            .collect());
    }

    debug!(count = urls.len(), first = %urls[0], "blog candidates found");
    Ok(urls)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the origin (scheme + host + port) from a URL.
pub fn origin_url(url: &Url) -> Result<String> {
    let scheme = url.scheme();
    let host = url
        .host_str()
        .ok_or_else(|| SiteBriefError::validation(format!("URL has no host: {url}")))?;

    match url.port() {
        Some(port) => Ok(format!("{scheme}://{host}:{port}")),
        None => Ok(format!("{scheme}://{host}")),
    }
}

/// Turn a raw link target into an absolute URL string.
///
/// Absolute URLs are kept verbatim; anchors and non-navigational schemes are
/// dropped.
fn resolve_candidate(base: &Url, origin: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(raw.to_string());
    }
    if ["mailto:", "javascript:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }
    if raw.starts_with("//") {
        return Some(format!("{}:{raw}", base.scheme()));
    }
    if raw.starts_with('/') {
        return Some(format!("{origin}{raw}"));
    }

    base.join(raw).ok().map(String::from)
}
