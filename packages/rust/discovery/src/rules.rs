//! Pattern rules for spotting blog links in scraped text.
//!
//! Each rule yields raw link targets in text order; rules are applied one
//! after another, so every match of an earlier rule precedes every match of
//! a later one.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `[text](target)` and `[text](target "title")`.
static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).expect("markdown link regex")
});

/// Matches `href="...blog..."` (either quote style).
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']*blog[^"']*)["']"#).expect("href regex")
});

/// Matches bare `http(s)://` URLs containing "blog".
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"'()\[\]]*blog[^\s<>"'()\[\]]*"#).expect("bare url regex")
});

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '"', '\''];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// All raw candidates, rule by rule.
pub(crate) fn candidates(content: &str) -> Vec<String> {
    let mut found = markdown_links(content);
    found.extend(href_attributes(content));
    found.extend(bare_urls(content));
    found
}

/// Rule 1: Markdown links whose text mentions "blog". Image links are skipped.
fn markdown_links(content: &str) -> Vec<String> {
    MD_LINK_RE
        .captures_iter(content)
        .filter(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            let is_image = start > 0 && content.as_bytes()[start - 1] == b'!';
            !is_image && caps[1].to_lowercase().contains("blog")
        })
        .map(|caps| caps[2].to_string())
        .collect()
}

/// Rule 2: raw `href` attribute values containing "blog".
fn href_attributes(content: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Rule 3: bare URLs containing "blog", as found in plain-text renderings.
fn bare_urls(content: &str) -> Vec<String> {
    BARE_URL_RE
        .find_iter(content)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
        .collect()
}
