//! Generative descriptions backed by a local Ollama server.
//!
//! Enabled with the `llm` cargo feature. [`OllamaDescriber::connect`] runs a
//! preflight check and fails with an "unavailable" error when the server or
//! the model is missing, so the caller can fall back to placeholder
//! descriptions. Once connected, failed requests only log and yield no
//! description.
//!
//! ```ignore
//! use docstamp::llm::OllamaDescriber;
//!
//! let describer = OllamaDescriber::connect(config.generative.clone()).await?;
//! let source = GenerativeDescriptions::new(Arc::new(describer));
//! ```

pub mod client;
pub mod error;
pub mod prompts;

pub use client::{OllamaClient, PreflightResult};
pub use error::{LlmError, Result};
pub use prompts::{DescriptionResponse, ParametersResponse, PromptBuilder};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::GenerativeConfig;
use crate::description::DescriptionService;
use crate::model::DeclarationKind;

/// [`DescriptionService`] talking to Ollama.
pub struct OllamaDescriber {
    client: OllamaClient,
}

impl OllamaDescriber {
    /// Creates the client and verifies the server serves the model.
    pub async fn connect(config: GenerativeConfig) -> Result<Self> {
        let client = OllamaClient::new(config)?;
        let preflight = client.preflight_check().await?;
        match &preflight {
            PreflightResult::Ok { model } => {
                info!(%model, "using description model");
            }
            PreflightResult::ModelNotFound {
                requested,
                available,
            } => {
                warn!(model = %requested, ?available, "description model not found");
            }
        }
        preflight.into_result()?;
        Ok(Self { client })
    }

    fn prompts(&self) -> PromptBuilder<'_> {
        PromptBuilder::new(&self.client.config().language)
    }
}

#[async_trait]
impl DescriptionService for OllamaDescriber {
    async fn describe_snippet(&self, kind: DeclarationKind, snippet: &str) -> Option<String> {
        let prompt = self.prompts().declaration(kind, snippet);
        match self.client.generate::<DescriptionResponse>(prompt).await {
            Ok(response) => non_empty(response.description),
            Err(error) => {
                debug!(%error, %kind, "declaration description failed");
                None
            }
        }
    }

    async fn describe_parameters(
        &self,
        snippet: &str,
        names: &[String],
        is_generic: bool,
    ) -> Option<FxHashMap<String, String>> {
        if names.is_empty() {
            return Some(FxHashMap::default());
        }
        let prompt = self.prompts().parameters(snippet, names, is_generic);
        match self.client.generate::<ParametersResponse>(prompt).await {
            Ok(response) => {
                let described: FxHashMap<String, String> = response
                    .parameters
                    .into_iter()
                    .filter(|p| names.contains(&p.name))
                    .map(|p| (p.name, p.description.trim().to_string()))
                    .collect();
                (!described.is_empty()).then_some(described)
            }
            Err(error) => {
                debug!(%error, is_generic, "parameter descriptions failed");
                None
            }
        }
    }

    async fn describe_return(&self, snippet: &str, return_type: &str) -> Option<String> {
        let prompt = self.prompts().return_value(snippet, return_type);
        match self.client.generate::<DescriptionResponse>(prompt).await {
            Ok(response) => non_empty(response.description),
            Err(error) => {
                debug!(%error, "return description failed");
                None
            }
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_are_dropped() {
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" Adds two numbers. ".into()), Some("Adds two numbers.".into()));
    }
}
