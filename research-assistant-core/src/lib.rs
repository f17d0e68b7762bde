//! Core types for research-assistant
//!
//! This crate provides the conversation store, session persistence,
//! report writer, configuration and logging used by the other
//! research-assistant components.

pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
