//! Error types for the Ollama description service.

use std::fmt;

/// Result type for generative description operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised while talking to the description model.
///
/// These never reach header generation: the describer turns them into
/// missing descriptions. They do surface when connecting, so the caller can
/// fall back to another strategy.
#[derive(Debug)]
pub enum LlmError {
    /// Invalid service settings.
    InvalidConfig { message: String },

    /// Ollama service is not running or not accessible.
    OllamaNotRunning {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Requested model is not available on the Ollama instance.
    ModelNotFound {
        model: String,
        available_models: Vec<String>,
    },

    /// Generation request failed.
    GenerationFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response could not be parsed or was empty.
    InvalidResponse {
        message: String,
        raw_response: String,
    },

    /// Request timeout.
    Timeout { seconds: u64 },
}

impl LlmError {
    /// Whether the service cannot be used at all, as opposed to one request
    /// failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LlmError::InvalidConfig { .. }
                | LlmError::OllamaNotRunning { .. }
                | LlmError::ModelNotFound { .. }
        )
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::InvalidConfig { message } => {
                write!(f, "Invalid generative settings: {message}")
            }
            LlmError::OllamaNotRunning { url, .. } => {
                write!(
                    f,
                    "Cannot connect to Ollama at {url}. Is Ollama running?\n\
                     Try: ollama serve"
                )
            }
            LlmError::ModelNotFound {
                model,
                available_models,
            } => {
                write!(
                    f,
                    "Model '{model}' not found. Available models: {}\n\
                     To download: ollama pull {model}",
                    if available_models.is_empty() {
                        "none (install a model first)".to_string()
                    } else {
                        available_models.join(", ")
                    }
                )
            }
            LlmError::GenerationFailed { message, .. } => {
                write!(f, "Description generation failed: {message}")
            }
            LlmError::InvalidResponse {
                message,
                raw_response,
            } => {
                let preview: String = raw_response.chars().take(100).collect();
                let ellipsis = if preview.len() < raw_response.len() {
                    "..."
                } else {
                    ""
                };
                write!(
                    f,
                    "Invalid model response: {message}\nResponse preview: {preview}{ellipsis}"
                )
            }
            LlmError::Timeout { seconds } => {
                write!(f, "Description request timed out after {seconds}s")
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::OllamaNotRunning { source, .. } => Some(&**source as &dyn std::error::Error),
            LlmError::GenerationFailed {
                source: Some(source),
                ..
            } => Some(&**source as &dyn std::error::Error),
            _ => None,
        }
    }
}
