//! Agent logic for research-assistant
//!
//! This crate provides command parsing, context building and the
//! turn-processing engine that drives the model client.

pub mod assistant;
pub mod command;
pub mod context;

pub use assistant::{
    ModelSettings, Reply, ReplyKind, ResearchAssistant, TurnError, EMPTY_INPUT_MESSAGE,
    MODEL_FAILURE_MESSAGE,
};
pub use command::Command;
pub use context::ContextBuilder;
