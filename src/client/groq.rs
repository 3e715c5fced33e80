//! Groq cloud client (OpenAI-compatible chat completions).
//!
//! One request per `invoke`. Retrying is the question generator's job, so
//! this client does not loop on failure.

use crate::client::provider::{http_client, probe, send_error, status_error};
use crate::client::{ChatModel, ChatResponse, HealthCheckResult, Message};
use crate::models::{ConfigError, ProviderError, QuizError, Result, Settings};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Chat completion request payload.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for Groq's OpenAI-compatible endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl GroqClient {
    /// Create a new Groq client.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        temperature: f64,
        timeout_secs: u64,
    ) -> std::result::Result<Self, ConfigError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = http_client(timeout)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        let api_key = settings
            .groq_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: "GROQ_API_KEY".to_string(),
            })?;

        Self::new(
            api_key,
            settings.groq_base_url.clone(),
            settings.groq_model.clone(),
            settings.temperature,
            settings.timeout_secs,
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            QuizError::Provider(ProviderError::AuthenticationFailed {
                provider: "groq".to_string(),
            })
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn request_body(&self, prompt: &str) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<ChatResponse> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("groq", &self.model, status, &body).into());
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| QuizError::Parse(format!("Failed to parse Groq response: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse("groq".to_string()))?;

        let (input_tokens, output_tokens) = body
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        debug!(
            model = %self.model,
            input_tokens,
            output_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Groq completion received"
        );

        Ok(ChatResponse {
            content,
            model: body.model.unwrap_or_else(|| self.model.clone()),
            input_tokens,
            output_tokens,
            duration: start.elapsed(),
        })
    }

    async fn health_check(&self) -> HealthCheckResult {
        let url = format!("{}/models", self.base_url);
        let request = match self.headers() {
            Ok(headers) => self.client.get(&url).headers(headers),
            Err(_) => self.client.get(&url),
        };
        probe("groq", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GroqClient {
        GroqClient::new(
            "gsk_test".to_string(),
            "https://api.groq.com/openai/v1/".to_string(),
            "llama-3.3-70b-versatile".to_string(),
            0.9,
            30,
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body("Write a question")).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["temperature"], 0.9);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Write a question");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"question\": \"q\"}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 34, "total_tokens": 46}
        }"#;
        let body: ChatCompletionResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(
            body.choices[0].message.content.as_deref(),
            Some(r#"{"question": "q"}"#)
        );
        assert_eq!(body.usage.unwrap().completion_tokens, 34);
    }

    #[test]
    fn test_bearer_header() {
        let headers = client().headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer gsk_test");
    }
}
