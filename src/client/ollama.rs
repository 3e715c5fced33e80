//! Ollama local inference client (native `/api/chat`).

use crate::client::provider::{http_client, probe, send_error, status_error};
use crate::client::{ChatModel, ChatResponse, HealthCheckResult, Message};
use crate::models::{ConfigError, ProviderError, QuizError, Result, Settings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Client for a local Ollama server. No authentication.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        temperature: f64,
        timeout_secs: u64,
    ) -> std::result::Result<Self, ConfigError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = http_client(timeout)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        Self::new(
            settings.ollama_base_url.clone(),
            settings.ollama_model.clone(),
            settings.temperature,
            settings.timeout_secs,
        )
    }

    fn request_body(&self, prompt: &str) -> OllamaChatRequest<'_> {
        OllamaChatRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<ChatResponse> {
        let start = Instant::now();
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("ollama", &self.model, status, &body).into());
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| QuizError::Parse(format!("Failed to parse Ollama response: {e}")))?;

        let content = body
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse("ollama".to_string()))?;

        debug!(
            model = %self.model,
            input_tokens = body.prompt_eval_count,
            output_tokens = body.eval_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ollama completion received"
        );

        Ok(ChatResponse {
            content,
            model: body.model.unwrap_or_else(|| self.model.clone()),
            input_tokens: body.prompt_eval_count,
            output_tokens: body.eval_count,
            duration: start.elapsed(),
        })
    }

    async fn health_check(&self) -> HealthCheckResult {
        let url = format!("{}/api/tags", self.base_url);
        probe("ollama", self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_disables_streaming() {
        let client = OllamaClient::new(
            "http://localhost:11434/".to_string(),
            "llama3:8b".to_string(),
            0.2,
            60,
        )
        .unwrap();
        let body = serde_json::to_value(client.request_body("hi")).unwrap();

        assert_eq!(body["model"], "llama3:8b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.2);
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "model": "llama3:8b",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "hello"},
            "done": true,
            "prompt_eval_count": 7,
            "eval_count": 3
        }"#;
        let body: OllamaChatResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(body.message.unwrap().content, "hello");
        assert_eq!(body.eval_count, 3);
    }
}
