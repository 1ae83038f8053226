//! Interactive chat surface for conversing with a retrieval-augmented
//! backend.
//!
//! This module provides a streaming REPL chat interface built on top of
//! the cicero client library. It supports:
//!
//! - Streaming responses with live status and citation display
//! - Thread switching, creation, and deletion
//! - Document upload and management for retrieval
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core session management and turn streaming
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, FAILED_RESPONSE_TEXT, SessionStats};
