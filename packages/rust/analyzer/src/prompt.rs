//! The business-analysis prompt.

use sitebrief_shared::AnalysisLimits;

/// Build the analysis prompt for a site.
///
/// Main content is cut to `limits.content_limit` characters and blog content
/// to `limits.blog_limit`; the cut is purely by character count.
pub fn build_prompt(content: &str, blog_content: Option<&str>, limits: &AnalysisLimits) -> String {
    let content = truncate_chars(content, limits.content_limit);
    let blog_section = blog_content
        .map(|blog| {
            format!(
                "\n\nBLOG SECTION CONTENT:\n{}",
                truncate_chars(blog, limits.blog_limit)
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are a business analyst. Read the website content below and answer these 4 questions:

1. What is this business about?
2. What are the core products or services offered?
3. Based on the products or services, who is the likely target audience?
4. Does the site have a blog? If so, what kind of content is published there? Name specific post titles, topics or links when available.

MAIN WEBSITE CONTENT:
{content}{blog_section}

Reply with ONLY a valid JSON object in exactly this shape (no Markdown, no code fences):
{{
  "businessAbout": "Detailed description of what the business is about",
  "coreProducts": "Detailed description of the core products or services",
  "targetAudience": "Detailed analysis of the likely target audience",
  "blogContent": "Analysis of the blog content with concrete titles or topics. If a blog exists but its content is unknown, give the blog URL and general theme. If there is no blog, answer 'No blog section found'"
}}

Each answer should be informative and at least 2-3 sentences long."#
    )
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_is_unchanged() {
        assert_eq!(truncate_chars("short text", 100), "short text");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn truncate_cuts_mid_word() {
        assert_eq!(truncate_chars("hello world", 7), "hello w");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
    }

    #[test]
    fn prompt_caps_main_content() {
        let content = "a".repeat(9_000);
        let prompt = build_prompt(&content, None, &AnalysisLimits::default());
        assert!(prompt.contains(&"a".repeat(8_000)));
        assert!(!prompt.contains(&"a".repeat(8_001)));
        assert!(!prompt.contains("BLOG SECTION CONTENT"));
    }

    #[test]
    fn prompt_caps_blog_content() {
        let blog = "b".repeat(4_000);
        let prompt = build_prompt("main", Some(&blog), &AnalysisLimits::default());
        assert!(prompt.contains(&format!("BLOG SECTION CONTENT:\n{}", "b".repeat(3_000))));
        assert!(!prompt.contains(&"b".repeat(3_001)));
    }

    #[test]
    fn prompt_names_all_four_keys() {
        let prompt = build_prompt("main", None, &AnalysisLimits::default());
        for key in ["businessAbout", "coreProducts", "targetAudience", "blogContent"] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }
}
