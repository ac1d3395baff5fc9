//! OpenRouter-backed implementation of [`ExtractionProvider`].
//!
//! Talks to any OpenAI-compatible chat-completions endpoint. Extraction
//! prompts ask for pure JSON, so requests pin temperature to 0.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use prospector_shared::config::ExtractionConfig;
use prospector_shared::{ProspectorError, Result};

use crate::ExtractionProvider;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("Prospector/", env!("CARGO_PKG_VERSION"));

/// System message sent with every extraction request.
const SYSTEM_PROMPT: &str = "You are a helpful research assistant. Return pure JSON.";

/// Extraction client for an OpenAI-compatible chat-completions API.
pub struct OpenRouterExtractor {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl OpenRouterExtractor {
    /// Create a new extraction client from config plus a resolved API key.
    pub fn new(api_key: String, config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ProspectorError::Extraction(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.default_model.clone(),
        })
    }
}

impl ExtractionProvider for OpenRouterExtractor {
    async fn complete(&self, instruction: &str, context: &str) -> Result<String> {
        let user_content = format!("{instruction}\n\n{context}");
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProspectorError::Extraction(format!("extraction request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProspectorError::Extraction(format!(
                "extraction: HTTP {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProspectorError::Extraction(format!("extraction response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProspectorError::Extraction("extraction returned no choices".into()))?;

        debug!(model = %self.model, response_len = content.len(), "extraction complete");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionProvider;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server_uri: &str) -> OpenRouterExtractor {
        let config = ExtractionConfig {
            base_url: server_uri.to_string(),
            ..Default::default()
        };
        OpenRouterExtractor::new("test-key".into(), &config).expect("build client")
    }

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({"temperature": 0.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"domain\": \"acme.com\"}"}}
                ]
            })))
            .mount(&server)
            .await;

        let content = client(&server.uri())
            .complete("Extract company info.", "search results here")
            .await
            .expect("complete");

        assert_eq!(content, "{\"domain\": \"acme.com\"}");
    }

    #[tokio::test]
    async fn complete_fails_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client(&server.uri()).complete("instruction", "context").await;

        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn complete_fails_on_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let result = client(&server.uri()).complete("instruction", "context").await;

        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("no choices"));
    }
}
