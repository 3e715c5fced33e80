//! LLM provider clients.

mod groq;
mod ollama;
mod provider;

#[cfg(test)]
pub(crate) mod scripted;

pub use groq::*;
pub use ollama::*;
pub use provider::{
    ChatModel, ChatResponse, HealthCheckResult, HealthStatus, Message, build_chat_model,
};
