//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default system prompt for a new research session
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a research assistant. Answer the user's questions \
to the best of your ability, explain your reasoning, and cite the sources you rely on whenever \
possible. Keep track of the findings made during the session so they can be summarized into a \
research report.";

/// Default request used by the `/summary` command
pub const DEFAULT_SUMMARY_PROMPT: &str = "Please summarize the key findings of our research \
session so far. List the main questions, the answers and explanations given, and any sources \
that were cited.";

/// Root configuration for research-assistant
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model endpoint configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Assistant behavior and output files
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider kind (ollama, openai)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL; the provider default is used when unset
    #[serde(default)]
    pub api_base: Option<String>,
    /// API key, sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Extra HTTP headers sent with every request
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_base: None,
            api_key: None,
            extra_headers: HashMap::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Assistant behavior and output files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// System prompt for fresh sessions
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Message sent for `/summary`
    #[serde(default = "default_summary_prompt")]
    pub summary_prompt: String,
    /// Markdown report path
    #[serde(default = "default_report_path")]
    pub report_path: String,
    /// Session snapshot path
    #[serde(default = "default_session_path")]
    pub session_path: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_summary_prompt() -> String {
    DEFAULT_SUMMARY_PROMPT.to_string()
}

fn default_report_path() -> String {
    "saved_output/research_report.md".to_string()
}

fn default_session_path() -> String {
    "saved_output/session.json".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            summary_prompt: default_summary_prompt(),
            report_path: default_report_path(),
            session_path: default_session_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.provider, "ollama");
        assert_eq!(config.model.model, "llama3.1");
        assert_eq!(config.assistant.report_path, "saved_output/research_report.md");
        assert_eq!(config.assistant.session_path, "saved_output/session.json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"model":{"model":"mistral"},"assistant":{}}"#).unwrap();
        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.provider, "ollama");
        assert_eq!(config.assistant.summary_prompt, DEFAULT_SUMMARY_PROMPT);
    }
}
