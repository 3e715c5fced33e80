//! Error types for study-buddy.
//!
//! Taxonomy:
//! - Retryable: provider/network failures, unparsable output, invalid questions
//! - Terminal: retries exhausted, bad configuration, bad caller input
//! - Export: IO and CSV failures outside the generation loop

use thiserror::Error;

/// Top-level error type for study-buddy.
#[derive(Debug, Error)]
pub enum QuizError {
    // ═══════════════════════════════════════════════════════════════════
    // RETRYABLE: caught and retried by the question generator
    // ═══════════════════════════════════════════════════════════════════
    #[error("LLM provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════════════
    // TERMINAL: visible to callers
    // ═══════════════════════════════════════════════════════════════════
    #[error("Failed to generate question after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: Box<QuizError>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ═══════════════════════════════════════════════════════════════════
    // EXPORT: filesystem and CSV
    // ═══════════════════════════════════════════════════════════════════
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors reported by an LLM provider endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: invalid API key for {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Model not found on {provider}: {model}")]
    ModelNotFound { provider: String, model: String },

    #[error("Rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    #[error("API error from {provider} (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

impl QuizError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this error is retried by the question generator.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::Parse(_)
                | Self::Validation(_)
        )
    }

    /// Number of attempts made, if this is a terminal generation failure.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::ExhaustedRetries { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// The last underlying cause of a terminal generation failure.
    pub fn last_cause(&self) -> Option<&QuizError> {
        match self {
            Self::ExhaustedRetries { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for study-buddy.
pub type Result<T> = std::result::Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classes() {
        assert!(QuizError::Parse("no json".into()).is_retryable());
        assert!(QuizError::Validation("missing blank".into()).is_retryable());
        assert!(QuizError::Provider(ProviderError::EmptyResponse("groq".into())).is_retryable());
        assert!(!QuizError::InvalidRequest("empty topic".into()).is_retryable());

        let exhausted = QuizError::ExhaustedRetries {
            attempts: 3,
            source: Box::new(QuizError::Parse("no json".into())),
        };
        assert!(!exhausted.is_retryable());
    }

    #[test]
    fn exhausted_retries_carries_cause() {
        let err = QuizError::ExhaustedRetries {
            attempts: 2,
            source: Box::new(QuizError::Validation("options must contain exactly 4 items".into())),
        };

        assert_eq!(err.attempts(), Some(2));
        assert!(matches!(err.last_cause(), Some(QuizError::Validation(_))));
        assert_eq!(
            err.to_string(),
            "Failed to generate question after 2 attempts: \
             Validation error: options must contain exactly 4 items"
        );
    }
}
