use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::Source;

/// The author of a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A message typed by the user.
    User,
    /// A message produced by the backend.
    Assistant,
}

/// A single message in the active conversation.
///
/// Content is mutable while `is_streaming` is true and only ever grows by
/// appending; once a turn finalizes the message is treated as immutable
/// and its citation sources are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Identifier unique within the session.
    pub id: String,

    /// Who authored the message.
    pub role: MessageRole,

    /// The message text.
    pub content: String,

    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// True while this message is receiving streamed chunks.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_streaming: bool,

    /// Citation sources, empty until the turn finalizes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatMessage {
    /// Creates a user message with the given id and content.
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::User,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            is_streaming: false,
            sources: Vec::new(),
        }
    }

    /// Creates an empty assistant message that will receive streamed chunks.
    pub fn streaming_placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            content: String::new(),
            created_at: OffsetDateTime::now_utc(),
            is_streaming: true,
            sources: Vec::new(),
        }
    }

    /// Returns true if this message was authored by the user.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
