//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::base::{LLMProvider, LLMResponse, Message, ProviderError, ProviderResult};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";

/// Ollama `/api/chat` request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama `/api/chat` response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<i64>,
    #[serde(default)]
    eval_count: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama provider client
pub struct OllamaClient {
    client: Client,
    api_base: String,
    default_model: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(api_base: Option<String>, default_model: String, timeout: Duration) -> Self {
        let api_base = api_base
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base,
            default_model,
        }
    }

    /// Endpoint base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn parse_response(&self, response: ChatResponse) -> ProviderResult<LLMResponse> {
        if let Some(error) = response.error {
            return Err(ProviderError::InvalidResponse(error));
        }

        let message = response
            .message
            .ok_or_else(|| ProviderError::InvalidResponse("No message in response".to_string()))?;

        let mut usage = HashMap::new();
        if let Some(prompt) = response.prompt_eval_count {
            usage.insert("prompt_tokens".to_string(), prompt);
        }
        if let Some(completion) = response.eval_count {
            usage.insert("completion_tokens".to_string(), completion);
        }

        Ok(LLMResponse {
            content: message.content,
            model: response.model,
            finish_reason: response.done_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat(
        &self,
        messages: &[Message],
        model: Option<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> ProviderResult<LLMResponse> {
        let model = model.unwrap_or_else(|| self.default_model.clone());
        let request = ChatRequest {
            model: &model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        debug!(
            "Sending chat request to {} with model {} ({} messages)",
            self.api_base,
            model,
            messages.len()
        );

        let url = format!("{}/api/chat", self.api_base);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        let response_data: ChatResponse = serde_json::from_str(&body)?;
        self.parse_response(response_data)
    }

    fn get_default_model(&self) -> String {
        self.default_model.clone()
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(None, "llama3.1".to_string(), Duration::from_secs(120))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ErrorKind, Role};
    use mockito::Matcher;
    use serde_json::json;

    fn conversation() -> Vec<Message> {
        vec![
            Message::new(Role::System, "You are a research assistant."),
            Message::new(Role::User, "What is a monad?"),
        ]
    }

    #[test]
    fn test_default_base() {
        let client = OllamaClient::default();
        assert_eq!(client.api_base(), DEFAULT_OLLAMA_BASE);
        assert_eq!(client.get_default_model(), "llama3.1");

        let client = OllamaClient::new(
            Some("http://gpu-box:11434/".to_string()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(client.api_base(), "http://gpu-box:11434");
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3.1",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "You are a research assistant."},
                    {"role": "user", "content": "What is a monad?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "model": "llama3.1",
                    "message": {"role": "assistant", "content": "A monoid in the category of endofunctors."},
                    "done": true,
                    "done_reason": "stop",
                    "prompt_eval_count": 21,
                    "eval_count": 9
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = OllamaClient::new(
            Some(server.url()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        );
        let response = client.chat(&conversation(), None, 256, 0.7).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "A monoid in the category of endofunctors.");
        assert_eq!(response.usage.get("completion_tokens"), Some(&9));
        assert_eq!(response.finish_reason, "stop");
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":"model 'nope' not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(
            Some(server.url()),
            "nope".to_string(),
            Duration::from_secs(5),
        );
        let err = client.chat(&conversation(), None, 256, 0.7).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = OllamaClient::new(
            Some(server.url()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        );
        let err = client.chat(&conversation(), None, 256, 0.7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_chat_missing_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"model":"llama3.1","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(
            Some(server.url()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        );
        let err = client.chat(&conversation(), None, 256, 0.7).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_unreachable_endpoint() {
        let client = OllamaClient::new(
            Some("http://127.0.0.1:1".to_string()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        );
        let err = client.chat(&conversation(), None, 256, 0.7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
