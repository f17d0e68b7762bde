//! Research assistant: the turn-processing engine

use research_assistant_core::config::Config;
use research_assistant_core::report::ReportWriter;
use research_assistant_core::session::{Conversation, SessionManager};
use research_assistant_core::utils::preview;
use research_assistant_providers::{ErrorKind, LLMProvider, ProviderError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::context::ContextBuilder;

/// Shown when an empty line is submitted
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a question.";

/// Shown when the model call fails
pub const MODEL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't get an answer from the model. Please try again.";

/// Why a turn produced no reply
#[derive(Error, Debug)]
pub enum TurnError {
    /// Nothing to ask
    #[error("empty input")]
    EmptyInput,

    /// The model client failed
    #[error("model call failed: {0}")]
    Model(#[from] ProviderError),
}

impl TurnError {
    /// Fixed text for the user
    pub fn user_message(&self) -> &'static str {
        match self {
            TurnError::EmptyInput => EMPTY_INPUT_MESSAGE,
            TurnError::Model(_) => MODEL_FAILURE_MESSAGE,
        }
    }

    /// Failure category of a model error
    pub fn model_error_kind(&self) -> Option<ErrorKind> {
        match self {
            TurnError::Model(e) => Some(e.kind()),
            TurnError::EmptyInput => None,
        }
    }
}

/// What a successful turn answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Answer to a user question
    Answer,
    /// Answer to the `/summary` request
    Summary,
}

/// A successful turn
#[derive(Debug)]
pub struct Reply {
    pub kind: ReplyKind,
    pub content: String,
    /// Set when the report record could not be written
    pub report_error: Option<research_assistant_core::Error>,
}

/// Model call parameters
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ModelSettings {
    /// Settings taken from the model configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        }
    }
}

/// Owns one conversation and runs turns against the model client
pub struct ResearchAssistant {
    provider: Arc<dyn LLMProvider>,
    settings: ModelSettings,
    context: ContextBuilder,
    conversation: Conversation,
    report: ReportWriter,
    sessions: SessionManager,
}

impl ResearchAssistant {
    /// Create a new assistant around an existing conversation
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        settings: ModelSettings,
        context: ContextBuilder,
        conversation: Conversation,
        report: ReportWriter,
        sessions: SessionManager,
    ) -> Self {
        Self {
            provider,
            settings,
            context,
            conversation,
            report,
            sessions,
        }
    }

    /// Create an assistant from configuration, resuming the session at
    /// `session_path` when it can be loaded
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn LLMProvider>,
        report_path: &Path,
        session_path: &Path,
    ) -> Self {
        let context = ContextBuilder::from_config(&config.assistant);
        let sessions = SessionManager::new(session_path);
        let conversation = sessions.load_or_new(session_path, context.system_prompt());
        Self::new(
            provider,
            ModelSettings::from_config(config),
            context,
            conversation,
            ReportWriter::new(report_path),
            sessions,
        )
    }

    /// The current conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Model settings in use
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Report file path
    pub fn report_path(&self) -> &Path {
        self.report.path()
    }

    /// Default session file path
    pub fn default_session_path(&self) -> &Path {
        self.sessions.default_path()
    }

    /// Answer one question.
    ///
    /// The question is appended before the model call. On failure it stays
    /// in the conversation without a reply, since the conversation is
    /// append-only.
    pub async fn ask(&mut self, question: &str) -> Result<Reply, TurnError> {
        if question.trim().is_empty() {
            debug!("Ignoring empty question");
            return Err(TurnError::EmptyInput);
        }
        self.run_turn(question.to_string(), ReplyKind::Answer).await
    }

    /// Ask the model to summarize the session so far
    pub async fn summarize(&mut self) -> Result<Reply, TurnError> {
        let request = self.context.summary_request().to_string();
        self.run_turn(request, ReplyKind::Summary).await
    }

    /// Save the conversation to `path`, or to the default session path
    pub fn save_session(&self, path: Option<&Path>) -> research_assistant_core::Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.sessions.default_path().to_path_buf());
        self.sessions.save(&self.conversation, &path)?;
        Ok(path)
    }

    async fn run_turn(&mut self, question: String, kind: ReplyKind) -> Result<Reply, TurnError> {
        info!(
            kind = ?kind,
            model = %self.settings.model,
            "Processing question: {}",
            preview(&question, 80)
        );

        self.conversation.push_user(question.as_str());

        let response = match self
            .provider
            .chat(
                self.conversation.snapshot(),
                Some(self.settings.model.clone()),
                self.settings.max_tokens,
                self.settings.temperature,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(kind = ?e.kind(), "Model call failed: {}", e);
                return Err(TurnError::Model(e));
            }
        };

        let content = response.content;
        info!(
            usage = ?response.usage,
            "Received reply: {}",
            preview(&content, 120)
        );
        self.conversation.push_assistant(content.as_str());

        let report_error = match self.report.append_record(&question, &content) {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    path = %self.report.path().display(),
                    "Failed to write report record: {}",
                    e
                );
                Some(e)
            }
        };

        Ok(Reply {
            kind,
            content,
            report_error,
        })
    }
}
