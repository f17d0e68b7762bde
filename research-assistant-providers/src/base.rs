//! Base trait for LLM providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use research_assistant_core::session::{Message, Role};

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Broad failure category, so callers can pick their own wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint unreachable, connection dropped or timed out
    Transport,
    /// Endpoint answered with something we could not understand
    Parse,
    /// Endpoint answered with a non-success status
    Api,
    /// Client settings are unusable
    Config,
}

impl ErrorKind {
    /// Short human-readable description of the category
    pub fn describe(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "the model endpoint could not be reached",
            ErrorKind::Parse => "the model endpoint returned a malformed response",
            ErrorKind::Api => "the model endpoint rejected the request",
            ErrorKind::Config => "the model client is misconfigured",
        }
    }
}

impl ProviderError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::HttpError(e) if e.is_decode() => ErrorKind::Parse,
            ProviderError::HttpError(e) if e.is_builder() => ErrorKind::Config,
            ProviderError::HttpError(_) => ErrorKind::Transport,
            ProviderError::JsonError(_) | ProviderError::InvalidResponse(_) => ErrorKind::Parse,
            ProviderError::ApiError { .. } => ErrorKind::Api,
            ProviderError::ConfigError(_) => ErrorKind::Config,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Response from an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_finish_reason")]
    pub finish_reason: String,
    #[serde(default)]
    pub usage: HashMap<String, i64>,
}

fn default_finish_reason() -> String {
    "stop".to_string()
}

impl LLMResponse {
    /// Create a response holding only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            finish_reason: default_finish_reason(),
            usage: HashMap::new(),
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a chat completion request with the full ordered conversation
    async fn chat(
        &self,
        messages: &[Message],
        model: Option<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> ProviderResult<LLMResponse>;

    /// Get the default model for this provider
    fn get_default_model(&self) -> String;
}
