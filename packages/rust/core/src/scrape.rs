//! Scrape stage: main page plus best-effort blog page.

use tracing::{debug, info, instrument, warn};
use url::Url;

use sitebrief_fetcher::{FetchOptions, PageFetcher};
use sitebrief_shared::{AppConfig, ScrapeResult, ScraperConfig};

/// Settings for [`scrape_website`].
#[derive(Debug, Clone, Default)]
pub struct ScrapeSettings {
    pub scraper: ScraperConfig,
    /// Locate and fetch a secondary blog page.
    pub fetch_blog: bool,
}

impl From<&AppConfig> for ScrapeSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            scraper: config.scraper.clone(),
            fetch_blog: config.analysis.fetch_blog,
        }
    }
}

/// Scrape `url` and, when enabled, its first blog candidate.
///
/// Never fails: a main-page error becomes [`ScrapeResult::failed`], and a
/// blog-page error only drops the blog content.
#[instrument(skip_all, fields(url = %url, provider = fetcher.name()))]
pub async fn scrape_website(
    fetcher: &dyn PageFetcher,
    url: &Url,
    settings: &ScrapeSettings,
) -> ScrapeResult {
    let main_opts = FetchOptions::main_page(&settings.scraper);
    let content = match fetcher.fetch_page(url, &main_opts).await {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "main page fetch failed");
            return ScrapeResult::failed(e.to_string());
        }
    };
    info!(chars = content.chars().count(), "main page scraped");

    let blog = if settings.fetch_blog {
        fetch_blog(fetcher, url, &content, &settings.scraper).await
    } else {
        debug!("blog discovery disabled");
        None
    };

    ScrapeResult::ok(content, blog)
}

/// Fetch the first blog candidate found in `content`, as `(url, text)`.
async fn fetch_blog(
    fetcher: &dyn PageFetcher,
    base: &Url,
    content: &str,
    scraper: &ScraperConfig,
) -> Option<(String, String)> {
    let candidates = match sitebrief_discovery::locate_blog_urls(base, content) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %e, "blog discovery failed");
            return None;
        }
    };
    let first = candidates.into_iter().next()?;

    let blog_url = match Url::parse(&first) {
        Ok(url) => url,
        Err(e) => {
            warn!(candidate = %first, error = %e, "blog candidate is not a valid URL");
            return None;
        }
    };

    match fetcher
        .fetch_page(&blog_url, &FetchOptions::blog_page(scraper))
        .await
    {
        Ok(text) => {
            info!(blog_url = %first, chars = text.chars().count(), "blog page scraped");
            Some((first, text))
        }
        Err(e) => {
            warn!(blog_url = %first, error = %e, "blog page fetch failed, continuing without it");
            None
        }
    }
}
