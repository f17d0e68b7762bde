//! Conversation data structures

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role (system, user, assistant)
    pub role: Role,
    /// Message content
    pub content: String,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// An append-only conversation that starts with exactly one system message.
///
/// Messages are only reachable through shared references, so a message
/// cannot change after it has been appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a fresh conversation seeded with the system prompt
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::new(Role::System, system_prompt)],
        }
    }

    /// Rebuild a conversation from persisted messages.
    ///
    /// The sequence must be non-empty, start with a system message and
    /// contain no other system message.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self> {
        match messages.first() {
            None => {
                return Err(Error::Session(
                    "conversation has no messages".to_string(),
                ))
            }
            Some(first) if first.role != Role::System => {
                return Err(Error::Session(format!(
                    "conversation must start with a system message, found {}",
                    first.role
                )))
            }
            Some(_) => {}
        }

        let system_count = messages.iter().filter(|m| m.role == Role::System).count();
        if system_count > 1 {
            return Err(Error::Session(format!(
                "conversation has {} system messages",
                system_count
            )));
        }

        Ok(Self { messages })
    }

    /// Append one message to the end of the conversation
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Result<()> {
        if role == Role::System {
            return Err(Error::Validation(
                "conversation already has a system message".to_string(),
            ));
        }
        self.messages.push(Message::new(role, content));
        Ok(())
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::User, content));
    }

    /// Append an assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::Assistant, content));
    }

    /// Full ordered message sequence, system prompt first
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// The system prompt this conversation was seeded with
    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages, including the system prompt
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: a conversation holds at least its system prompt
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages with the given role
    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_creation() {
        let conversation = Conversation::new("You are a research assistant.");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.snapshot()[0].role, Role::System);
        assert_eq!(conversation.system_prompt(), "You are a research assistant.");
    }

    #[test]
    fn test_fresh_conversations_do_not_share_history() {
        let mut first = Conversation::new("prompt");
        first.push_user("only in the first session");

        let second = Conversation::new("prompt");
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new("prompt");
        conversation.append(Role::User, "Hello").unwrap();
        conversation.append(Role::Assistant, "Hi there!").unwrap();
        conversation.push_user("Follow-up");

        let roles: Vec<Role> = conversation.snapshot().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(conversation.last().unwrap().content, "Follow-up");
    }

    #[test]
    fn test_append_rejects_second_system_message() {
        let mut conversation = Conversation::new("prompt");
        let err = conversation.append(Role::System, "again").unwrap_err();
        assert!(err.to_string().contains("system message"));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_count_by_role() {
        let mut conversation = Conversation::new("prompt");
        conversation.push_user("q1");
        conversation.push_assistant("a1");
        conversation.push_user("q2");

        assert_eq!(conversation.count(Role::System), 1);
        assert_eq!(conversation.count(Role::User), 2);
        assert_eq!(conversation.count(Role::Assistant), 1);
    }

    #[test]
    fn test_from_messages_validation() {
        assert!(Conversation::from_messages(vec![]).is_err());
        assert!(Conversation::from_messages(vec![Message::new(Role::User, "hi")]).is_err());
        assert!(Conversation::from_messages(vec![
            Message::new(Role::System, "a"),
            Message::new(Role::System, "b"),
        ])
        .is_err());

        let conversation = Conversation::from_messages(vec![
            Message::new(Role::System, "a"),
            Message::new(Role::User, "b"),
        ])
        .unwrap();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::new(Role::Assistant, "x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
