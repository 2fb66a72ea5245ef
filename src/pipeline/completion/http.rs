use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::CompletionConfig;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpCompletionClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompletionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

/// Pull the text out of a chat completion body.
///
/// Providers differ: most put it under `choices[0].message.content`, some
/// legacy ones under `choices[0].text`.
pub fn extract_completion_text(body: &serde_json::Value) -> Result<String, CompletionError> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| CompletionError::ResponseParsing("no choices in response".into()))?;

    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .or_else(|| choice.get("text").and_then(|t| t.as_str()));

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(CompletionError::EmptyResponse),
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                CompletionError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                CompletionError::Timeout(self.timeout_secs)
            } else {
                CompletionError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        tracing::debug!(model = %self.model, "Completion received");
        extract_completion_text(&parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
