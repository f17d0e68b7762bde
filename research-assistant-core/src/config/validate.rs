//! Configuration validation rules.

use super::schema::Config;

/// Provider kinds understood by the model client factory.
pub const KNOWN_PROVIDERS: &[&str] = &["ollama", "openai"];

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if !KNOWN_PROVIDERS.contains(&config.model.provider.as_str()) {
        errors.push(format!(
            "model.provider must be one of [{}], got '{}'",
            KNOWN_PROVIDERS.join(", "),
            config.model.provider
        ));
    }
    if config.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".to_string());
    }
    if config.model.max_tokens == 0 {
        errors.push("model.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.model.temperature) {
        errors.push("model.temperature must be in [0.0, 2.0]".to_string());
    }
    if config.model.timeout_secs == 0 {
        errors.push("model.timeout_secs must be > 0".to_string());
    }
    if let Some(base) = &config.model.api_base {
        if !base.trim().is_empty() && !base.starts_with("http://") && !base.starts_with("https://")
        {
            errors.push("model.api_base must start with http:// or https://".to_string());
        }
    }

    if config.assistant.system_prompt.trim().is_empty() {
        errors.push("assistant.system_prompt must not be empty".to_string());
    }
    if config.assistant.summary_prompt.trim().is_empty() {
        errors.push("assistant.summary_prompt must not be empty".to_string());
    }
    if config.assistant.report_path.trim().is_empty() {
        errors.push("assistant.report_path must not be empty".to_string());
    }
    if config.assistant.session_path.trim().is_empty() {
        errors.push("assistant.session_path must not be empty".to_string());
    }

    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push("logging.format must be 'text' or 'json'".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(errors.join("; ")))
    }
}
