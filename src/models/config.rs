//! Settings for study-buddy.
//!
//! Values come from an optional TOML file, then the process environment
//! (a `.env` file is loaded first when present). Environment wins.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Resolved application settings.
///
/// Constructed once at startup and passed by reference to the provider
/// factory and the question generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Use the local Ollama server instead of Groq
    pub use_ollama: bool,

    /// Groq API key (required unless `use_ollama`)
    pub groq_api_key: Option<String>,

    /// Groq model id
    pub groq_model: String,

    /// Groq OpenAI-compatible base URL
    pub groq_base_url: String,

    /// Ollama model name as pulled
    pub ollama_model: String,

    /// Ollama server URL
    pub ollama_base_url: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f64,

    /// Maximum generation attempts per question
    pub max_retries: i64,

    /// Fixed delay between generation attempts
    pub retry_backoff_ms: u64,

    /// Provider request timeout in seconds
    pub timeout_secs: u64,

    /// Directory for the rotating log file
    pub logs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_ollama: false,
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            ollama_model: "glm-4.7-flash:q4_K_M".to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            temperature: 0.9,
            max_retries: 3,
            retry_backoff_ms: 0,
            timeout_secs: 120,
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Load settings the way the binary does: optional file, `.env`, environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        env_file_loaded(dotenvy::dotenv())?;

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file. Unspecified keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    ///
    /// Unparsable numbers fall back to the defaults rather than failing.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        if let Some(v) = lookup("USE_OLLAMA") {
            self.use_ollama = parse_bool(&v);
        }
        if let Some(v) = lookup("GROQ_API_KEY") {
            let v = v.trim();
            self.groq_api_key = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = lookup("GROQ_MODEL") {
            self.groq_model = v;
        }
        if let Some(v) = lookup("GROQ_BASE_URL") {
            self.groq_base_url = v;
        }
        if let Some(v) = lookup("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = lookup("TEMPERATURE") {
            self.temperature = v.trim().parse().unwrap_or(defaults.temperature);
        }
        if let Some(v) = lookup("MAX_RETRIES") {
            self.max_retries = v.trim().parse().unwrap_or(defaults.max_retries);
        }
        if let Some(v) = lookup("RETRY_BACKOFF_MS") {
            self.retry_backoff_ms = v.trim().parse().unwrap_or(defaults.retry_backoff_ms);
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().unwrap_or(defaults.timeout_secs);
        }
        if let Some(v) = lookup("LOGS_DIR") {
            self.logs_dir = PathBuf::from(v);
        }

        self.ollama_model = self.ollama_model.trim().to_string();
    }

    /// Check ranges and required credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_key = self
            .groq_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !self.use_ollama && !has_key {
            return Err(ConfigError::MissingApiKey {
                env_var: "GROQ_API_KEY".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::OutOfRange {
                key: "TEMPERATURE",
                message: format!("must be between 0.0 and 2.0, got {}", self.temperature),
            });
        }

        if self.max_retries < 0 {
            return Err(ConfigError::OutOfRange {
                key: "MAX_RETRIES",
                message: format!("must be >= 0, got {}", self.max_retries),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "REQUEST_TIMEOUT_SECS",
                message: "must be >= 1".to_string(),
            });
        }

        if self.active_model().is_empty() {
            return Err(ConfigError::MissingModel {
                provider: self.provider_name(),
            });
        }

        Ok(())
    }

    /// Model id of the selected provider.
    pub fn active_model(&self) -> &str {
        if self.use_ollama {
            &self.ollama_model
        } else {
            &self.groq_model
        }
    }

    /// Name of the selected provider.
    pub fn provider_name(&self) -> &'static str {
        if self.use_ollama { "ollama" } else { "groq" }
    }

    /// Attempts per question; a configured 0 still makes one attempt.
    pub fn max_attempts(&self) -> u32 {
        u32::try_from(self.max_retries).unwrap_or(u32::MAX).max(1)
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{env_var} is required when USE_OLLAMA=false")]
    MissingApiKey { env_var: String },

    #[error("No model configured for provider '{provider}'")]
    MissingModel { provider: &'static str },

    #[error("{key} {message}")]
    OutOfRange { key: &'static str, message: String },

    #[error("Failed to load .env file: {0}")]
    EnvFile(#[source] dotenvy::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn env_file_loaded(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e)),
    }
}
