//! In-memory `ChatModel` that replays a fixed script of replies.

use crate::client::{ChatModel, ChatResponse, HealthCheckResult, HealthStatus};
use crate::models::{ProviderError, QuizError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted reply.
pub enum Reply {
    Text(String),
    ProviderDown,
}

pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `text` once the script runs out.
    pub fn repeating(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn invoke(&self, prompt: &str) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.replies.lock().unwrap().pop_front();
        let text = match next {
            Some(Reply::Text(text)) => text,
            Some(Reply::ProviderDown) => {
                return Err(QuizError::Provider(ProviderError::Api {
                    provider: "scripted".to_string(),
                    status: 503,
                    message: "unavailable".to_string(),
                }));
            }
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ProviderError::EmptyResponse("scripted".to_string()))?,
        };

        Ok(ChatResponse {
            content: text,
            model: "scripted-model".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            duration: Duration::ZERO,
        })
    }

    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            endpoint: "scripted".to_string(),
            status: HealthStatus::Healthy,
            latency_ms: Some(0),
            error: None,
        }
    }
}
