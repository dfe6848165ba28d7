//! Provider selection from configuration.

use tracing::debug;

use sitebrief_analyzer::{DecodingParams, GeminiClient, LanguageModel, OpenAiClient};
use sitebrief_fetcher::{DirectFetcher, FirecrawlFetcher, PageFetcher};
use sitebrief_shared::{AppConfig, Credentials, LlmProvider, Result, ScraperProvider};

/// Build the page fetcher selected by `config.scraper.provider`.
pub fn build_fetcher(config: &AppConfig, credentials: &Credentials) -> Result<Box<dyn PageFetcher>> {
    debug!(provider = config.scraper.provider.as_str(), "building page fetcher");
    match config.scraper.provider {
        ScraperProvider::Firecrawl => Ok(Box::new(FirecrawlFetcher::new(
            credentials.scraper_api_key()?,
            &config.scraper.base_url,
        )?)),
        ScraperProvider::Direct => Ok(Box::new(DirectFetcher::new()?)),
    }
}

/// Build the language model selected by `config.llm.provider`.
pub fn build_model(config: &AppConfig, credentials: &Credentials) -> Result<Box<dyn LanguageModel>> {
    let llm = &config.llm;
    let api_key = credentials.llm_api_key()?;
    let params = DecodingParams::from(llm);
    debug!(provider = llm.provider.as_str(), model = llm.model_id(), "building language model");

    match llm.provider {
        LlmProvider::Gemini => Ok(Box::new(GeminiClient::new(
            api_key,
            llm.api_base_url(),
            llm.model_id(),
            params,
        )?)),
        LlmProvider::OpenAi => Ok(Box::new(OpenAiClient::new(
            api_key,
            llm.api_base_url(),
            llm.model_id(),
            params,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitebrief_shared::SiteBriefError;

    #[test]
    fn selects_configured_providers() {
        let mut config = AppConfig::default();
        let creds = Credentials::new("fc-key", "llm-key");

        assert_eq!(build_fetcher(&config, &creds).unwrap().name(), "firecrawl");
        assert_eq!(build_model(&config, &creds).unwrap().name(), "gemini");

        config.scraper.provider = ScraperProvider::Direct;
        config.llm.provider = LlmProvider::OpenAi;
        assert_eq!(build_fetcher(&config, &creds).unwrap().name(), "direct");
        assert_eq!(build_model(&config, &creds).unwrap().name(), "openai");
    }

    #[test]
    fn direct_fetcher_needs_no_key() {
        let mut config = AppConfig::default();
        config.scraper.provider = ScraperProvider::Direct;
        assert!(build_fetcher(&config, &Credentials::default()).is_ok());
    }

    #[test]
    fn missing_keys_are_reported() {
        let config = AppConfig::default();
        let creds = Credentials::default();
        assert!(matches!(
            build_fetcher(&config, &creds),
            Err(SiteBriefError::MissingCredential(_))
        ));
        assert!(matches!(
            build_model(&config, &creds),
            Err(SiteBriefError::MissingCredential(_))
        ));
    }
}
