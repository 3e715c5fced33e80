//! Question generator: prompt → LLM → parse → validate, with bounded retries.

use crate::client::ChatModel;
use crate::generator::{parser, prompts, schema};
use crate::models::{
    Difficulty, FillBlankQuestion, GenerationRequest, McqQuestion, Question, QuestionType,
    QuizError, Result, Settings,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Bookkeeping for one `generate` call.
#[derive(Debug)]
pub struct RetryState {
    /// Current attempt, starting at 1
    pub attempt: u32,
    /// Attempt bound, at least 1
    pub max_attempts: u32,
    /// Failure of the most recent attempt
    pub last_error: Option<QuizError>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
            last_error: None,
        }
    }

    pub fn record_failure(&mut self, error: QuizError) {
        self.last_error = Some(error);
    }

    /// Move to the next attempt; false once the bound is reached.
    pub fn advance(&mut self) -> bool {
        if self.attempt < self.max_attempts {
            self.attempt += 1;
            true
        } else {
            false
        }
    }

    /// Terminal error carrying the last cause and the attempt count.
    pub fn into_error(self) -> QuizError {
        let source = self
            .last_error
            .unwrap_or_else(|| QuizError::Validation("no attempt was made".to_string()));
        QuizError::ExhaustedRetries {
            attempts: self.attempt,
            source: Box::new(source),
        }
    }
}

/// Generates validated questions from an LLM provider.
pub struct QuestionGenerator {
    model: Arc<dyn ChatModel>,
    max_attempts: u32,
    backoff: Duration,
}

impl QuestionGenerator {
    /// Create a generator making at most `max_attempts` attempts per question.
    pub fn new(model: Arc<dyn ChatModel>, max_attempts: u32) -> Self {
        Self {
            model,
            max_attempts: max_attempts.max(1),
            backoff: Duration::ZERO,
        }
    }

    /// Create a generator using the retry settings.
    pub fn from_settings(model: Arc<dyn ChatModel>, settings: &Settings) -> Self {
        Self::new(model, settings.max_attempts())
            .with_backoff(Duration::from_millis(settings.retry_backoff_ms))
    }

    /// Fixed delay between failed attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }

    /// Generate one question, retrying any failure up to the attempt bound.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Question> {
        // Requests built without `GenerationRequest::new` skip its topic check
        if request.topic.trim().is_empty() {
            return Err(QuizError::InvalidRequest(
                "topic must not be empty".to_string(),
            ));
        }

        let prompt = prompts::prompt_for(request);
        let mut state = RetryState::new(self.max_attempts);

        loop {
            info!(
                attempt = state.attempt,
                max_attempts = state.max_attempts,
                topic = %request.topic,
                difficulty = %request.difficulty,
                question_type = %request.question_type,
                "Generating question"
            );

            match self.attempt(&prompt, request.question_type).await {
                Ok(question) => {
                    info!(attempt = state.attempt, question = %question.text(), "Generated question");
                    return Ok(question);
                }
                Err(e) => {
                    warn!(attempt = state.attempt, error = %e, "Question attempt failed");
                    state.record_failure(e);
                }
            }

            if !state.advance() {
                break;
            }

            if !self.backoff.is_zero() {
                debug!(backoff_ms = self.backoff.as_millis() as u64, "Waiting before retry");
                tokio::time::sleep(self.backoff).await;
            }
        }

        let err = state.into_error();
        error!(error = %err, "Question generation failed");
        Err(err)
    }

    /// Generate a multiple-choice question.
    pub async fn generate_mcq(&self, topic: &str, difficulty: Difficulty) -> Result<McqQuestion> {
        let request = GenerationRequest::new(topic, difficulty, QuestionType::Mcq)?;
        match self.generate(&request).await? {
            Question::Mcq(q) => Ok(q),
            Question::FillBlank(_) => Err(QuizError::Validation(
                "expected a multiple-choice question".to_string(),
            )),
        }
    }

    /// Generate a fill-in-the-blank question.
    pub async fn generate_fill_blank(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<FillBlankQuestion> {
        let request = GenerationRequest::new(topic, difficulty, QuestionType::FillBlank)?;
        match self.generate(&request).await? {
            Question::FillBlank(q) => Ok(q),
            Question::Mcq(_) => Err(QuizError::Validation(
                "expected a fill-in-the-blank question".to_string(),
            )),
        }
    }

    /// One round trip: invoke, parse, validate.
    async fn attempt(&self, prompt: &str, question_type: QuestionType) -> Result<Question> {
        let response = self.model.invoke(prompt).await?;
        debug!(
            provider = self.model.name(),
            model = %response.model,
            elapsed_ms = response.duration.as_millis() as u64,
            "Model replied"
        );

        let raw = parser::parse(&response.content, question_type)?;
        schema::validate(&raw)
    }
}
