//! Conversation history and session persistence
//!
//! A conversation is an append-only list of role-tagged messages. Sessions
//! persist a conversation as a JSON array so it can be resumed later.

pub mod manager;
pub mod store;

pub use manager::{SessionInfo, SessionManager};
pub use store::{Conversation, Message, Role};
