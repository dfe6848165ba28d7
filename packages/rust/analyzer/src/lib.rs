//! Business analysis of scraped site content with a language model.
//!
//! The analyzer sends one fixed prompt per site and expects a JSON object
//! with the four [`AnalysisData`] fields back. When the completion cannot be
//! parsed, a keyword heuristic synthesizes the fields instead and the result
//! is tagged [`AnalysisQuality::Heuristic`]; only provider failures are
//! errors.

mod gemini;
mod openai;
pub mod prompt;
pub mod response;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use sitebrief_shared::{
    Analysis, AnalysisData, AnalysisLimits, AnalysisQuality, LlmConfig, Result, SiteBriefError,
};

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// User-Agent string for outbound requests.
pub(crate) const USER_AGENT: &str = concat!("SiteBrief/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A text-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the single text completion.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for tracing.
    fn name(&self) -> &str;
}

/// Fixed decoding parameters: low randomness, bounded output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for DecodingParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze site content (plus optional blog content) with `model`.
///
/// 1. Build the prompt from truncated inputs
/// 2. Request one completion
/// 3. Parse it strictly, or fall back to the keyword heuristic
#[instrument(skip_all, fields(model = model.name(), content_len = content.len()))]
pub async fn analyze(
    model: &dyn LanguageModel,
    content: &str,
    blog_content: Option<&str>,
    limits: &AnalysisLimits,
) -> Result<Analysis> {
    let blog_content = blog_content.filter(|b| !b.trim().is_empty());
    let prompt = prompt::build_prompt(content, blog_content, limits);
    debug!(prompt_len = prompt.len(), "sending analysis prompt");

    let completion = model.complete(&prompt).await?;
    let cleaned = response::clean_completion(&completion);

    match response::parse_analysis(&cleaned) {
        Some(data) => {
            info!("analysis parsed from structured response");
            Ok(Analysis {
                data,
                quality: AnalysisQuality::Exact,
            })
        }
        None => {
            warn!(
                completion_len = cleaned.len(),
                "completion is not valid analysis JSON, using heuristic fallback"
            );
            Ok(Analysis {
                data: response::fallback_analysis(&cleaned, blog_content.is_some()),
                quality: AnalysisQuality::Heuristic,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Provider helpers
// ---------------------------------------------------------------------------

/// `{"error": {"message": "..."}}`, the error envelope both providers use.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-2xx provider response to an error, reading the provider's
/// message from the body when there is one.
pub(crate) async fn status_error(response: reqwest::Response) -> SiteBriefError {
    let status = response.status();
    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message);
    SiteBriefError::http_status(status.as_u16(), status.canonical_reason(), message)
}

/// Transport failure, with the request URL stripped (it may carry a key).
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> SiteBriefError {
    SiteBriefError::Network(format!("{provider} request failed: {}", err.without_url()))
}

/// Build the shared HTTP client.
pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SiteBriefError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a canned completion and records prompts.
    struct CannedModel {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(SiteBriefError::Provider)
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    const EXACT_JSON: &str = r#"{
  "businessAbout": "Acme forges anvils for cartoon coyotes.",
  "coreProducts": "Anvils, rocket skates and giant magnets.",
  "targetAudience": "Coyotes with ambitious roadrunner plans.",
  "blogContent": "No blog section found"
}"#;

    #[tokio::test]
    async fn well_formed_json_round_trips_exactly() {
        let model = CannedModel::replying(EXACT_JSON);
        let analysis = analyze(&model, "content", None, &AnalysisLimits::default())
            .await
            .unwrap();
        assert_eq!(analysis.quality, AnalysisQuality::Exact);
        assert_eq!(analysis.data.business_about, "Acme forges anvils for cartoon coyotes.");
        assert_eq!(analysis.data.core_products, "Anvils, rocket skates and giant magnets.");
        assert_eq!(analysis.data.target_audience, "Coyotes with ambitious roadrunner plans.");
        assert_eq!(analysis.data.blog_content, "No blog section found");
    }

    #[tokio::test]
    async fn fenced_json_is_unwrapped() {
        let model = CannedModel::replying(&format!("```json\n{EXACT_JSON}\n```"));
        let analysis = analyze(&model, "content", None, &AnalysisLimits::default())
            .await
            .unwrap();
        assert_eq!(analysis.quality, AnalysisQuality::Exact);
        assert_eq!(analysis.data.blog_content, "No blog section found");
    }

    #[tokio::test]
    async fn prose_falls_back_to_heuristic() {
        let model = CannedModel::replying(
            "I cannot produce JSON today. Their main audience is hobby bakers! Thanks",
        );
        let analysis = analyze(&model, "content", None, &AnalysisLimits::default())
            .await
            .unwrap();
        assert_eq!(analysis.quality, AnalysisQuality::Heuristic);
        assert_eq!(analysis.data.target_audience, "Their main audience is hobby bakers.");
        assert!(analysis.data.is_complete());
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let model = CannedModel::failing("HTTP 503: Service Unavailable");
        let err = analyze(&model, "content", None, &AnalysisLimits::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[tokio::test]
    async fn blog_content_reaches_the_prompt() {
        let model = CannedModel::replying(EXACT_JSON);
        analyze(&model, "main text", Some("latest posts"), &AnalysisLimits::default())
            .await
            .unwrap();
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("main text"));
        assert!(prompts[0].contains("BLOG SECTION CONTENT:\nlatest posts"));
    }

    #[tokio::test]
    async fn blank_blog_content_is_treated_as_absent() {
        let model = CannedModel::replying("nothing useful");
        let analysis = analyze(&model, "main", Some("  "), &AnalysisLimits::default())
            .await
            .unwrap();
        assert!(!model.prompts.lock().unwrap()[0].contains("BLOG SECTION"));
        assert_eq!(analysis.data.blog_content, response::NO_BLOG_FALLBACK);
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_output() {
        for reply in [EXACT_JSON, "Plain prose about the company. Nothing more"] {
            let model = CannedModel::replying(reply);
            let limits = AnalysisLimits::default();
            let first = analyze(&model, "same", Some("blog"), &limits).await.unwrap();
            let second = analyze(&model, "same", Some("blog"), &limits).await.unwrap();
            assert_eq!(first, second);
            let prompts = model.prompts.lock().unwrap();
            assert_eq!(prompts[0], prompts[1]);
        }
    }

    #[test]
    fn decoding_params_defaults() {
        let params = DecodingParams::default();
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.top_k, 32);
        assert_eq!(params.top_p, 0.95);
        assert_eq!(params.max_output_tokens, 2_000);
    }
}
