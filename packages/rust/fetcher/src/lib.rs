//! Page content fetching through a scraping provider.
//!
//! This crate provides:
//! - [`PageFetcher`] — the provider-neutral capability (`url -> text`)
//! - [`FirecrawlFetcher`] — hosted scraping API that renders JavaScript
//! - [`DirectFetcher`] — plain HTTP fetch with local tag filtering and
//!   HTML-to-Markdown conversion
//! - [`normalize_url`] — user input to a fetchable URL
//!
//! Every failure is terminal for that call; nothing is retried.

mod cleanup;
mod direct;
mod extract;
mod firecrawl;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use sitebrief_shared::{Result, ScraperConfig, SiteBriefError};
use url::Url;

pub use direct::DirectFetcher;
pub use firecrawl::FirecrawlFetcher;

/// User-Agent string for outbound requests.
pub(crate) const USER_AGENT: &str = concat!("SiteBrief/", env!("CARGO_PKG_VERSION"));

/// Tags kept when extracting a site's main page.
const MAIN_PAGE_INCLUDE_TAGS: &[&str] = &["title", "meta", "h1", "h2", "h3", "p", "a", "div", "span"];

/// Tags stripped from every extraction.
const EXCLUDE_TAGS: &[&str] = &["script", "style", "nav", "footer", "header"];

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Extraction and rendering hints for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Tags whose content is kept.
    pub include_tags: Vec<String>,
    /// Tags whose content is dropped, even inside included tags.
    pub exclude_tags: Vec<String>,
    /// How long a rendering provider waits before extracting (ms).
    pub wait_for_ms: u64,
    /// Overall fetch timeout (ms).
    pub timeout_ms: u64,
}

impl FetchOptions {
    /// Options for a site's landing page.
    pub fn main_page(config: &ScraperConfig) -> Self {
        Self {
            include_tags: to_owned(MAIN_PAGE_INCLUDE_TAGS),
            exclude_tags: to_owned(EXCLUDE_TAGS),
            wait_for_ms: config.wait_for_ms,
            timeout_ms: config.timeout_ms,
        }
    }

    /// Options for a blog page: the main-page set plus `<article>`.
    pub fn blog_page(config: &ScraperConfig) -> Self {
        let mut opts = Self::main_page(config);
        opts.include_tags.push("article".into());
        opts
    }
}

fn to_owned(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| (*t).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A scraping backend that turns a URL into extracted page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its non-empty extracted text.
    async fn fetch_page(&self, url: &Url, opts: &FetchOptions) -> Result<String>;

    /// Provider name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

/// Parse user input into an HTTP(S) URL, prepending `https://` when no
/// scheme is given.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SiteBriefError::validation("Please enter a valid URL"));
    }

    static SCHEME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid regex"));

    // Only a leading scheme counts; `://` may appear later in a query string.
    let candidate = if SCHEME_RE.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| SiteBriefError::validation(format!("invalid URL '{trimmed}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SiteBriefError::validation(format!(
                "unsupported URL scheme '{other}': expected http or https"
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(SiteBriefError::validation(format!("URL has no host: {trimmed}")));
    }

    Ok(url)
}
