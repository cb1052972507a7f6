//! Ollama client for generative descriptions.

use std::time::Duration;

use ollama_rs::{
    Ollama,
    generation::completion::request::GenerationRequest,
    generation::parameters::{FormatType, JsonStructure},
    models::ModelOptions,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::error::{LlmError, Result};
use crate::config::GenerativeConfig;

const DEFAULT_PORT: u16 = 11434;

/// Client for interacting with Ollama.
pub struct OllamaClient {
    client: Ollama,
    config: GenerativeConfig,
}

impl OllamaClient {
    /// Creates a client for the configured server. Does not connect.
    pub fn new(config: GenerativeConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                message: "model name cannot be empty".to_string(),
            });
        }
        config
            .validate()
            .map_err(|message| LlmError::InvalidConfig { message })?;

        let (host, port) = split_url(&config.url)?;
        let client = Ollama::new(host, port);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GenerativeConfig {
        &self.config
    }

    /// Checks that Ollama is reachable and serves the configured model.
    pub async fn preflight_check(&self) -> Result<PreflightResult> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| LlmError::OllamaNotRunning {
                url: self.config.url.clone(),
                source: Box::new(e),
            })?;

        let available: Vec<String> = models.iter().map(|m| m.name.clone()).collect();
        let tagged = format!("{}:", self.config.model);
        let has_model = available
            .iter()
            .any(|name| name == &self.config.model || name.starts_with(&tagged));

        if !has_model {
            return Ok(PreflightResult::ModelNotFound {
                requested: self.config.model.clone(),
                available,
            });
        }

        Ok(PreflightResult::Ok {
            model: self.config.model.clone(),
        })
    }

    /// Sends `prompt` and parses the answer as `T`, constraining the model to
    /// `T`'s JSON schema.
    pub async fn generate<T>(&self, prompt: String) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let request = GenerationRequest::new(self.config.model.clone(), prompt)
            .format(FormatType::StructuredJson(Box::new(JsonStructure::new::<T>())))
            .options(ModelOptions::default().temperature(self.config.temperature));

        let response = match tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.generate(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(LlmError::GenerationFailed {
                    message: format!("Ollama generation error: {e}"),
                    source: Some(Box::new(e)),
                });
            }
            Err(_) => {
                return Err(LlmError::Timeout {
                    seconds: self.config.timeout_seconds,
                });
            }
        };

        parse_response(&response.response)
    }
}

/// Splits `http://host:port` into the host with scheme and the port.
fn split_url(url: &str) -> Result<(String, u16)> {
    let url = url.trim_end_matches('/');
    let (scheme, rest) = if let Some(stripped) = url.strip_prefix("https://") {
        ("https", stripped)
    } else if let Some(stripped) = url.strip_prefix("http://") {
        ("http", stripped)
    } else {
        ("http", url)
    };

    let (hostname, port) = match rest.split_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| LlmError::InvalidConfig {
                message: format!("invalid port number in URL: {port}"),
            })?;
            (host, port)
        }
        None => (rest, DEFAULT_PORT),
    };
    Ok((format!("{scheme}://{hostname}"), port))
}

fn parse_response<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json = extract_json(raw);
    serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse {
        message: format!("Failed to parse JSON: {e}"),
        raw_response: raw.to_string(),
    })
}

/// Extracts a JSON object from a response that might carry a preamble or a
/// markdown fence.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        if let Some(newline) = text[content_start..].find('\n') {
            let body_start = content_start + newline + 1;
            if let Some(end) = text[body_start..].find("```") {
                return text[body_start..body_start + end].trim();
            }
        }
    }

    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if first < last {
            return text[first..=last].trim();
        }
    }

    text
}

/// Result of a preflight check.
#[derive(Debug)]
pub enum PreflightResult {
    Ok {
        model: String,
    },
    /// Ollama is running but does not serve the requested model.
    ModelNotFound {
        requested: String,
        available: Vec<String>,
    },
}

impl PreflightResult {
    pub fn into_result(self) -> Result<()> {
        match self {
            PreflightResult::Ok { .. } => Ok(()),
            PreflightResult::ModelNotFound {
                requested,
                available,
            } => Err(LlmError::ModelNotFound {
                model: requested,
                available_models: available,
            }),
        }
    }
}
