//! In-memory providers for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use sitebrief_analyzer::LanguageModel;
use sitebrief_fetcher::{FetchOptions, PageFetcher};
use sitebrief_shared::{Result, SiteBriefError};

/// Serves canned pages by exact URL; anything else is a 404.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<(String, FetchOptions)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn options(&self) -> Vec<FetchOptions> {
        self.calls.lock().unwrap().iter().map(|(_, o)| o.clone()).collect()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_page(&self, url: &Url, opts: &FetchOptions) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), opts.clone()));
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| SiteBriefError::http_status(404, Some("Not Found"), None))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Replies with a fixed completion and records every prompt.
pub struct StubModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
