//! study-buddy - LLM-generated quizzes with validated, retried question synthesis.
//!
//! ## Architecture
//!
//! - **Client**: one `ChatModel` capability, implemented for Groq (cloud,
//!   OpenAI-compatible) and Ollama (local), selected from `Settings`
//! - **Generator**: prompt → LLM → structured parse → schema validation,
//!   retried up to the configured attempt bound
//! - **Quiz**: generates N questions sequentially, scores answers, exports CSV
//!
//! ## Errors
//!
//! Provider, parse and validation failures are retried inside the generator.
//! Callers only see `QuizError::ExhaustedRetries` (with the last cause and the
//! attempt count), configuration errors, and invalid requests.

pub mod client;
pub mod generator;
pub mod models;
pub mod quiz;

// Re-exports for convenience
pub use client::{ChatModel, GroqClient, OllamaClient, build_chat_model};
pub use generator::{QuestionGenerator, RetryState};
pub use models::{
    ConfigError, Difficulty, FillBlankQuestion, GenerationRequest, McqQuestion, Question,
    QuestionType, QuizError, Result, Settings,
};
pub use quiz::{QuizManager, QuizResult, ScoreSummary};
