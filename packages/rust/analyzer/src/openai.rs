//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sitebrief_shared::{Result, SiteBriefError};

use crate::{DecodingParams, LanguageModel, build_client, status_error, transport_error};

/// Chat-completions client for OpenAI and API-compatible servers.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    params: DecodingParams,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        params: DecodingParams,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.into(),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            params,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    #[instrument(skip_all, fields(provider = "openai", model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        // Chat completions have no top-k.
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            max_tokens: self.params.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: ChatResponse = response.json().await.map_err(|_| invalid_response())?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.is_empty())
            .ok_or_else(invalid_response)?;

        debug!(completion_len = text.len(), "OpenAI completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn invalid_response() -> SiteBriefError {
    SiteBriefError::Analysis("Invalid response from OpenAI API".into())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new("sk-test", &server.uri(), "gpt-4o-mini", DecodingParams::default())
            .unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 2000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "{\"ok\":true}"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).complete("hello").await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn null_content_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "analysis error: Invalid response from OpenAI API");
    }

    #[tokio::test]
    async fn unauthorized_uses_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "Incorrect API key provided");
    }
}
