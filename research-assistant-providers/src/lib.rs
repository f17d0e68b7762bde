//! LLM provider integrations for research-assistant
//!
//! This crate provides the model client abstraction and its Ollama and
//! OpenAI-compatible implementations.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{ErrorKind, LLMProvider, LLMResponse, Message, ProviderError, ProviderResult, Role};
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use research_assistant_core::config::ModelConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the model client selected by `config.provider`
pub fn build_provider(config: &ModelConfig) -> ProviderResult<Arc<dyn LLMProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let provider: Arc<dyn LLMProvider> = match config.provider.as_str() {
        "ollama" => Arc::new(OllamaClient::new(
            config.api_base.clone(),
            config.model.clone(),
            timeout,
        )),
        "openai" => Arc::new(OpenAIClient::new(
            config.api_key.clone(),
            config.api_base.clone(),
            config.model.clone(),
            Some(config.extra_headers.clone()).filter(|headers| !headers.is_empty()),
            timeout,
        )),
        other => {
            return Err(ProviderError::ConfigError(format!(
                "Unknown provider: {}",
                other
            )))
        }
    };

    info!(provider = %config.provider, model = %config.model, "Model client ready");
    Ok(provider)
}
