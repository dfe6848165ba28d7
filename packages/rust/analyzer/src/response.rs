//! Parsing language-model completions into [`AnalysisData`].
//!
//! The strict path accepts a JSON object with all four fields as non-empty
//! strings. The fallback path is lossy: it picks sentences by keyword and
//! never fails.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use sitebrief_shared::AnalysisData;

pub const BUSINESS_FALLBACK: &str = "Based on the website content, this appears to be a business or organization, but specific details about their focus could not be clearly determined.";
pub const PRODUCTS_FALLBACK: &str = "The specific products or services offered by this business could not be clearly identified from the available content.";
pub const AUDIENCE_FALLBACK: &str = "The target audience for this business could not be clearly determined from the available information.";
pub const BLOG_FOUND_FALLBACK: &str = "Blog content was found but could not be properly analyzed. Please check the website directly for blog details.";
pub const NO_BLOG_FALLBACK: &str = "No clear information about blog content or publishing activity was found on the website.";

const BUSINESS_KEYWORDS: &[&str] = &["business", "company", "about"];
const PRODUCT_KEYWORDS: &[&str] = &["product", "service", "offer"];
const AUDIENCE_KEYWORDS: &[&str] = &["audience", "customer", "target"];

/// Sentences at least this long (exclusive) count as substantial.
const SUBSTANTIAL_SENTENCE_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Cleaning & strict parsing
// ---------------------------------------------------------------------------

/// Trim the completion and remove Markdown code fences.
pub fn clean_completion(text: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)```(?:json)?\s*").expect("valid regex"));

    FENCE_RE.replace_all(text.trim(), "").trim().to_string()
}

/// Parse cleaned completion text into [`AnalysisData`].
///
/// Tries the whole text first, then the span from the first `{` to the last
/// `}` for answers wrapped in prose. Returns `None` when neither yields all
/// four fields as non-empty strings.
pub fn parse_analysis(text: &str) -> Option<AnalysisData> {
    if let Some(data) = parse_strict(text) {
        return Some(data);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    debug!("retrying parse on embedded JSON object");
    parse_strict(&text[start..=end])
}

fn parse_strict(text: &str) -> Option<AnalysisData> {
    match serde_json::from_str::<AnalysisData>(text) {
        Ok(data) if data.is_complete() => Some(data),
        Ok(_) => {
            debug!("analysis JSON has empty fields");
            None
        }
        Err(e) => {
            debug!(error = %e, "analysis JSON did not parse");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Heuristic fallback
// ---------------------------------------------------------------------------

/// Synthesize all four fields from unstructured text.
///
/// The blog field is never read from the text; it is a fixed sentence chosen
/// by whether blog content was supplied.
pub fn fallback_analysis(text: &str, has_blog: bool) -> AnalysisData {
    let sentences = split_sentences(text);

    AnalysisData {
        business_about: extract_info(&sentences, BUSINESS_KEYWORDS)
            .unwrap_or_else(|| BUSINESS_FALLBACK.to_string()),
        core_products: extract_info(&sentences, PRODUCT_KEYWORDS)
            .unwrap_or_else(|| PRODUCTS_FALLBACK.to_string()),
        target_audience: extract_info(&sentences, AUDIENCE_KEYWORDS)
            .unwrap_or_else(|| AUDIENCE_FALLBACK.to_string()),
        blog_content: if has_blog {
            BLOG_FOUND_FALLBACK
        } else {
            NO_BLOG_FALLBACK
        }
        .to_string(),
    }
}

/// Split on runs of `.`, `!` and `?`, dropping blank pieces.
fn split_sentences(text: &str) -> Vec<&str> {
    static SENTENCE_END_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

    SENTENCE_END_RE
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// First sentence containing a keyword (keywords tried in order), else the
/// first substantial sentence; trimmed, with a period.
fn extract_info(sentences: &[&str], keywords: &[&str]) -> Option<String> {
    let chosen = keywords
        .iter()
        .find_map(|keyword| {
            sentences
                .iter()
                .find(|sentence| sentence.to_lowercase().contains(keyword))
        })
        .or_else(|| {
            sentences
                .iter()
                .find(|s| s.trim().chars().count() > SUBSTANTIAL_SENTENCE_CHARS)
        })?;

    Some(format!("{}.", chosen.trim()))
}
