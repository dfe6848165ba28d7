//! Direct page fetcher: plain HTTP GET plus local extraction.
//!
//! Unlike a rendering provider this does not execute JavaScript, so the
//! `wait_for_ms` hint has no effect.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use sitebrief_shared::{Result, SiteBriefError};

use crate::extract;
use crate::{FetchOptions, PageFetcher, USER_AGENT};

/// Maximum number of redirects followed per fetch.
const MAX_REDIRECTS: usize = 5;

/// Fetches pages itself and extracts text locally.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| SiteBriefError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for DirectFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_page(&self, url: &Url, opts: &FetchOptions) -> Result<String> {
        info!("fetching page directly");

        let response = self
            .client
            .get(url.clone())
            .timeout(Duration::from_millis(opts.timeout_ms))
            .send()
            .await
            .map_err(|e| SiteBriefError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteBriefError::http_status(
                status.as_u16(),
                status.canonical_reason(),
                None,
            ));
        }

        // Redirects may have moved us; links resolve against the final URL.
        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| SiteBriefError::Network(format!("{url}: failed to read body: {e}")))?;

        let markdown = extract::html_to_markdown(&html, opts, &final_url)?;
        if markdown.is_empty() {
            return Err(SiteBriefError::EmptyContent(
                "No content extracted from the website".into(),
            ));
        }

        debug!(html_len = html.len(), content_len = markdown.len(), "direct fetch successful");
        Ok(markdown)
    }

    fn name(&self) -> &str {
        "direct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitebrief_shared::ScraperConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn opts() -> FetchOptions {
        FetchOptions::main_page(&ScraperConfig::default())
    }

    #[tokio::test]
    async fn fetches_and_extracts_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><nav>Menu</nav><h1>Acme</h1><p>Anvils for everyone.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let content = DirectFetcher::new().unwrap().fetch_page(&url, &opts()).await.unwrap();
        assert!(content.contains("# Acme"));
        assert!(content.contains("Anvils for everyone."));
        assert!(!content.contains("Menu"));
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = DirectFetcher::new().unwrap().fetch_page(&url, &opts()).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[tokio::test]
    async fn page_without_text_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><script>app()</script></body></html>"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = DirectFetcher::new().unwrap().fetch_page(&url, &opts()).await.unwrap_err();
        assert!(matches!(err, SiteBriefError::EmptyContent(_)));
    }
}
