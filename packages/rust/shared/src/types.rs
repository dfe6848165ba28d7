//! Core domain types for SiteBrief.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SiteBriefError};

/// Maximum characters of main page content embedded in the analysis prompt.
pub const DEFAULT_CONTENT_LIMIT: usize = 8_000;

/// Maximum characters of blog content embedded in the analysis prompt.
pub const DEFAULT_BLOG_LIMIT: usize = 3_000;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// ScrapeResult
// ---------------------------------------------------------------------------

/// Outcome of scraping a site: main content plus optional blog content,
/// or a human-readable error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_content: Option<String>,
    /// The secondary URL the blog content came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Successfully scraped text, as returned by [`ScrapeResult::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedSite {
    pub content: String,
    pub blog_content: Option<String>,
    pub blog_url: Option<String>,
}

impl ScrapeResult {
    /// A successful scrape. Blog content is kept only when non-empty.
    pub fn ok(content: String, blog: Option<(String, String)>) -> Self {
        let (blog_url, blog_content) = match blog {
            Some((url, text)) if !text.is_empty() => (Some(url), Some(text)),
            _ => (None, None),
        };
        Self {
            success: true,
            content: Some(content),
            blog_content,
            blog_url,
            error: None,
        }
    }

    /// A failed scrape carrying a human-readable message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            blog_content: None,
            blog_url: None,
            error: Some(error.into()),
        }
    }

    /// Convert into the crate `Result`, treating a missing or empty main
    /// content as a failure.
    pub fn into_result(self) -> Result<ScrapedSite> {
        if !self.success {
            return Err(SiteBriefError::Provider(
                self.error
                    .unwrap_or_else(|| "Failed to scrape website".to_string()),
            ));
        }
        match self.content {
            Some(content) if !content.is_empty() => Ok(ScrapedSite {
                content,
                blog_content: self.blog_content,
                blog_url: self.blog_url,
            }),
            _ => Err(SiteBriefError::EmptyContent(
                "No content extracted from the website".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// The four answers produced by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    /// What is this business about?
    pub business_about: String,
    /// What are the core products or services offered?
    pub core_products: String,
    /// Who can be the target audience?
    pub target_audience: String,
    /// Do they have a blog, and what do they publish?
    pub blog_content: String,
}

impl AnalysisData {
    /// `true` when every field holds non-blank text.
    pub fn is_complete(&self) -> bool {
        [
            &self.business_about,
            &self.core_products,
            &self.target_audience,
            &self.blog_content,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// How an [`AnalysisData`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisQuality {
    /// Parsed from a structured model response.
    Exact,
    /// Synthesized from unstructured text by keyword heuristics.
    Heuristic,
}

impl std::fmt::Display for AnalysisQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// Analysis answers tagged with their provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub data: AnalysisData,
    pub quality: AnalysisQuality,
}

// ---------------------------------------------------------------------------
// SiteReport
// ---------------------------------------------------------------------------

/// Result of one end-to-end run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    /// Identifier of the run that produced this report.
    pub run_id: RunId,
    /// The normalized URL that was analyzed.
    pub url: String,
    /// Secondary page whose content was included, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    pub analysis: Analysis,
    /// Length of the scraped main content, in characters.
    pub content_chars: usize,
    /// Length of the scraped blog content, in characters.
    pub blog_chars: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
