//! Session persistence for conversations

use super::store::{Conversation, Message};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Saves and restores conversations as JSON session files
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Session file used when the caller does not pick one
    default_path: PathBuf,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new<P: AsRef<Path>>(default_path: P) -> Self {
        Self {
            default_path: default_path.as_ref().to_path_buf(),
        }
    }

    /// Default session file path
    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Load the session at `path`, or start a fresh conversation
    pub fn load_or_new<P: AsRef<Path>>(&self, path: P, system_prompt: &str) -> Conversation {
        let path = path.as_ref();
        match self.load(path) {
            Some(conversation) => {
                info!(
                    path = %path.display(),
                    messages = conversation.len(),
                    "Resumed session"
                );
                conversation
            }
            None => {
                debug!(path = %path.display(), "Starting a fresh session");
                Conversation::new(system_prompt)
            }
        }
    }

    /// Load a session from disk.
    ///
    /// Missing files and malformed content both yield `None`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Option<Conversation> {
        let path = path.as_ref();
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read session file {}: {}", path.display(), e);
                return None;
            }
        };

        let messages: Vec<Message> = match serde_json::from_str(&content) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Failed to parse session file {}: {}", path.display(), e);
                return None;
            }
        };

        match Conversation::from_messages(messages) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                warn!("Ignoring session file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save a session to disk, overwriting any existing file
    pub fn save<P: AsRef<Path>>(&self, conversation: &Conversation, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(conversation.snapshot())?;
        std::fs::write(path, content)?;
        info!(
            path = %path.display(),
            messages = conversation.len(),
            "Session saved"
        );
        Ok(())
    }

    /// List session files stored next to the default session file
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        let dir = match self.default_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut sessions = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(conversation) = self.load(&path) {
                    let modified = entry.metadata().and_then(|m| m.modified()).ok();
                    sessions.push(SessionInfo {
                        path,
                        messages: conversation.len(),
                        modified,
                    });
                }
            }
        }

        sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
        sessions
    }
}

/// Information about a stored session
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// File path
    pub path: PathBuf,
    /// Number of messages, including the system prompt
    pub messages: usize,
    /// Last modification time
    pub modified: Option<SystemTime>,
}
