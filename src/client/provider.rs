//! Provider capability shared by the Groq and Ollama clients.
//!
//! The question generator only needs "send prompt, get text". Both providers
//! implement [`ChatModel`] and are chosen from [`Settings`] at startup.

use crate::client::{GroqClient, OllamaClient};
use crate::models::{ConfigError, ProviderError, QuizError, Result, Settings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from a single chat call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text
    pub content: String,
    /// Model that answered (may differ from requested)
    pub model: String,
    /// Prompt tokens, when the provider reports them
    pub input_tokens: u32,
    /// Completion tokens, when the provider reports them
    pub output_tokens: u32,
    /// Round-trip time
    pub duration: Duration,
}

/// A chat-completion capability.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name for logging ("groq", "ollama").
    fn name(&self) -> &str;

    /// Model id requests are sent to.
    fn model(&self) -> &str;

    /// Send one user prompt and return the reply. Makes exactly one request.
    async fn invoke(&self, prompt: &str) -> Result<ChatResponse>;

    /// Probe the endpoint without generating anything.
    async fn health_check(&self) -> HealthCheckResult;
}

/// Build the provider selected by `settings.use_ollama`.
///
/// Fails with a configuration error before any request is made.
pub fn build_chat_model(
    settings: &Settings,
) -> std::result::Result<Box<dyn ChatModel>, ConfigError> {
    settings.validate()?;

    let model: Box<dyn ChatModel> = if settings.use_ollama {
        Box::new(OllamaClient::from_settings(settings)?)
    } else {
        Box::new(GroqClient::from_settings(settings)?)
    };
    Ok(model)
}

/// Build a reqwest client with the request timeout applied.
pub(crate) fn http_client(timeout: Duration) -> std::result::Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Map a transport failure to the crate error.
pub(crate) fn send_error(e: reqwest::Error, timeout: Duration) -> QuizError {
    if e.is_timeout() {
        QuizError::Timeout(timeout)
    } else {
        QuizError::Network(e)
    }
}

/// API error body used by OpenAI-compatible servers and Ollama.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Nested { error: ApiErrorDetail },
    Flat { error: String },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Map a non-success HTTP status to a provider error.
pub(crate) fn status_error(provider: &str, model: &str, status: u16, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody::Nested { error }) => error.message,
        Ok(ApiErrorBody::Flat { error }) => error,
        Err(_) => body.trim().to_string(),
    };

    match status {
        401 | 403 => ProviderError::AuthenticationFailed {
            provider: provider.to_string(),
        },
        404 => ProviderError::ModelNotFound {
            provider: provider.to_string(),
            model: model.to_string(),
        },
        429 => ProviderError::RateLimited {
            provider: provider.to_string(),
            message,
        },
        _ => ProviderError::Api {
            provider: provider.to_string(),
            status,
            message,
        },
    }
}

/// Health check result.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    /// Provider name
    pub endpoint: String,
    /// Health status
    pub status: HealthStatus,
    /// Latency in milliseconds (if reachable)
    pub latency_ms: Option<u64>,
    /// Error message (if unhealthy or unreachable)
    pub error: Option<String>,
}

/// Health status of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Endpoint is responding normally
    Healthy,
    /// Endpoint is responding but with errors
    Unhealthy,
    /// Endpoint is not reachable
    Unreachable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Send a probe request and classify the outcome.
pub(crate) async fn probe(endpoint: &str, request: reqwest::RequestBuilder) -> HealthCheckResult {
    let start = std::time::Instant::now();

    match request.timeout(Duration::from_secs(10)).send().await {
        Ok(response) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            if response.status().is_success() {
                HealthCheckResult {
                    endpoint: endpoint.to_string(),
                    status: HealthStatus::Healthy,
                    latency_ms: Some(latency_ms),
                    error: None,
                }
            } else {
                HealthCheckResult {
                    endpoint: endpoint.to_string(),
                    status: HealthStatus::Unhealthy,
                    latency_ms: Some(latency_ms),
                    error: Some(format!("HTTP {}", response.status().as_u16())),
                }
            }
        }
        Err(e) => HealthCheckResult {
            endpoint: endpoint.to_string(),
            status: HealthStatus::Unreachable,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(
            "groq",
            "llama-3.3-70b-versatile",
            401,
            r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
        );
        assert!(matches!(err, ProviderError::AuthenticationFailed { .. }));

        let err = status_error("ollama", "llama3", 404, r#"{"error":"model 'llama3' not found"}"#);
        assert!(matches!(err, ProviderError::ModelNotFound { ref model, .. } if model == "llama3"));

        let err = status_error("groq", "m", 429, r#"{"error":{"message":"slow down"}}"#);
        assert!(matches!(err, ProviderError::RateLimited { ref message, .. } if message == "slow down"));

        let err = status_error("groq", "m", 503, "upstream unavailable\n");
        match err {
            ProviderError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_factory_selects_provider() {
        let mut settings = Settings {
            use_ollama: true,
            ..Settings::default()
        };
        let model = build_chat_model(&settings).unwrap();
        assert_eq!(model.name(), "ollama");
        assert_eq!(model.model(), "glm-4.7-flash:q4_K_M");

        settings.use_ollama = false;
        assert!(matches!(
            build_chat_model(&settings),
            Err(ConfigError::MissingApiKey { .. })
        ));

        settings.groq_api_key = Some("gsk_test".to_string());
        let model = build_chat_model(&settings).unwrap();
        assert_eq!(model.name(), "groq");
        assert_eq!(model.model(), "llama-3.3-70b-versatile");
    }
}
