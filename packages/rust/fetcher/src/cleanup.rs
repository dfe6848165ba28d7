//! Post-conversion cleanup passes for directly fetched pages.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Run every cleanup pass on raw Markdown text.
pub(crate) fn run_pipeline(md: &str, base_url: Option<&Url>) -> String {
    let mut result = strip_leftover_html(md);
    result = resolve_links(&result, base_url);
    result = normalize_whitespace(&result);
    result = collapse_blank_lines(&result);
    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Strip leftover wrapper tags
// ---------------------------------------------------------------------------

/// Remove layout tags that survived the conversion, keeping their text.
/// Fenced code blocks are left untouched.
fn strip_leftover_html(md: &str) -> String {
    static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"</?(?:div|span|section|article|aside|header|footer|figure|figcaption|details|summary|main)(?:\s[^>]*)?>")
            .expect("valid regex")
    });

    let mut in_code_block = false;
    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                return line.to_string();
            }
            if in_code_block {
                line.to_string()
            } else {
                HTML_TAG_RE.replace_all(line, "").to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Resolve relative links
// ---------------------------------------------------------------------------

/// Resolve relative URLs in Markdown links against the page URL.
fn resolve_links(md: &str, base_url: Option<&Url>) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").expect("valid regex"));

    let Some(base) = base_url else {
        return md.to_string();
    };

    LINK_RE
        .replace_all(md, |caps: &regex::Captures| {
            let text = &caps[1];
            let href = &caps[2];

            if href.starts_with("http://")
                || href.starts_with("https://")
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                return caps[0].to_string();
            }

            match base.join(href) {
                Ok(resolved) => format!("[{text}]({resolved})"),
                Err(_) => caps[0].to_string(),
            }
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Whitespace
// ---------------------------------------------------------------------------

/// Trim trailing whitespace on every line.
fn normalize_whitespace(md: &str) -> String {
    md.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

/// Collapse runs of blank lines into a single blank line.
fn collapse_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_leftover_html_keeps_text() {
        let result = strip_leftover_html("<div class=\"hero\">Big news</div>");
        assert_eq!(result, "Big news");
    }

    #[test]
    fn strip_leftover_html_preserves_code_blocks() {
        let input = "```html\n<div>Preserved</div>\n```\n<span>gone</span>";
        let result = strip_leftover_html(input);
        assert!(result.contains("<div>Preserved</div>"));
        assert!(result.ends_with("gone"));
    }

    #[test]
    fn resolve_links_relative_resolved() {
        let base = Url::parse("https://acme.example/company/about").unwrap();
        let result = resolve_links("[Team](team) [Blog](/blog)", Some(&base));
        assert_eq!(
            result,
            "[Team](https://acme.example/company/team) [Blog](https://acme.example/blog)"
        );
    }

    #[test]
    fn resolve_links_leaves_absolute_and_anchors() {
        let base = Url::parse("https://acme.example/").unwrap();
        let input = "[Other](https://other.example/x) [Top](#top) [Mail](mailto:a@b.c)";
        assert_eq!(resolve_links(input, Some(&base)), input);
    }

    #[test]
    fn pipeline_collapses_blank_runs_and_trims() {
        let result = run_pipeline("\n\nTitle   \n\n\n\n\nBody\t\n\n", None);
        assert_eq!(result, "Title\n\nBody");
    }
}
