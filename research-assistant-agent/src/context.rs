//! Context builder for conversations and synthetic requests

use research_assistant_core::config::AssistantConfig;
use research_assistant_core::session::Conversation;

/// Builds fresh conversations and the fixed summary request
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
    summary_prompt: String,
}

impl ContextBuilder {
    /// Create a new context builder
    pub fn new(system_prompt: impl Into<String>, summary_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            summary_prompt: summary_prompt.into(),
        }
    }

    /// Create a context builder from the assistant configuration
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(&config.system_prompt, &config.summary_prompt)
    }

    /// System prompt for new conversations
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// A new conversation seeded with the system prompt.
    ///
    /// Every call returns an independent conversation.
    pub fn fresh_conversation(&self) -> Conversation {
        Conversation::new(&self.system_prompt)
    }

    /// User message submitted for `/summary`
    pub fn summary_request(&self) -> &str {
        &self.summary_prompt
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}
