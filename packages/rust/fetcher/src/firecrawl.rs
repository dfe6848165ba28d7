//! Firecrawl scraping API client (`POST /v1/scrape`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use sitebrief_shared::{Result, SiteBriefError};

use crate::{FetchOptions, PageFetcher, USER_AGENT};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    include_tags: &'a [String],
    exclude_tags: &'a [String],
    wait_for: u64,
    timeout: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Fetches pages through the Firecrawl API, which renders them server-side
/// and returns Markdown.
#[derive(Debug, Clone)]
pub struct FirecrawlFetcher {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl FirecrawlFetcher {
    /// Create a client for the API at `base_url` (e.g. `https://api.firecrawl.dev`).
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SiteBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/v1/scrape", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl PageFetcher for FirecrawlFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_page(&self, url: &Url, opts: &FetchOptions) -> Result<String> {
        info!("scraping page via Firecrawl");

        let body = ScrapeRequest {
            url: url.as_str(),
            formats: ["markdown"],
            include_tags: &opts.include_tags,
            exclude_tags: &opts.exclude_tags,
            wait_for: opts.wait_for_ms,
            timeout: opts.timeout_ms,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SiteBriefError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let provider_message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error);
            return Err(SiteBriefError::http_status(
                status.as_u16(),
                status.canonical_reason(),
                provider_message,
            ));
        }

        let parsed: ScrapeResponse = response.json().await.map_err(|e| {
            SiteBriefError::Provider(format!("invalid response from Firecrawl: {e}"))
        })?;

        if !parsed.success {
            return Err(SiteBriefError::Provider(
                parsed.error.unwrap_or_else(|| "Scraping failed".to_string()),
            ));
        }

        let markdown = parsed.data.and_then(|d| d.markdown).unwrap_or_default();
        if markdown.is_empty() {
            return Err(SiteBriefError::EmptyContent(
                "No content extracted from the website".into(),
            ));
        }

        debug!(content_len = markdown.len(), "Firecrawl scrape successful");
        Ok(markdown)
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}
