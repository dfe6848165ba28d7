//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sitebrief_shared::{Result, SiteBriefError};

use crate::{DecodingParams, LanguageModel, build_client, status_error, transport_error};

/// Gemini text-completion client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    params: DecodingParams,
}

impl GeminiClient {
    /// Create a client for `model` served from `base_url`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: &str,
        params: DecodingParams,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.into(),
            endpoint: format!(
                "{}/v1beta/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
            params,
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip_all, fields(provider = "gemini"))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                top_k: self.params.top_k,
                top_p: self.params.top_p,
                max_output_tokens: self.params.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|_| invalid_response())?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(invalid_response)?;

        debug!(completion_len = text.len(), "Gemini completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn invalid_response() -> SiteBriefError {
    SiteBriefError::Analysis("Invalid response from Gemini API".into())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-1.5-flash-latest";

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("g-key", &server.uri(), MODEL, DecodingParams::default()).unwrap()
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {"topK": 32, "maxOutputTokens": 2000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "first"}], "role": "model"}},
                    {"content": {"parts": [{"text": "second"}], "role": "model"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).complete("hello").await.unwrap();
        assert_eq!(text, "first");
    }

    #[tokio::test]
    async fn missing_candidates_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "analysis error: Invalid response from Gemini API");
    }

    #[tokio::test]
    async fn error_status_uses_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "API key not valid");
    }

    #[tokio::test]
    async fn error_status_without_body_uses_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }
}
