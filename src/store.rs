//! The ordered, mutable collection of messages for the active session.
//!
//! Insertion order is display order. Messages are never removed one at
//! a time; the store is reset wholesale on thread switch or explicit
//! clear. Id uniqueness is the caller's responsibility.

use crate::types::ChatMessage;

/// Conversation history for one session.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the tail.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Mutates the message with the given id in place.
    ///
    /// A missing id is a no-op, not an error: a turn may try to update
    /// its placeholder after the store was reset underneath it.
    pub fn update_by_id(&mut self, id: &str, update: impl FnOnce(&mut ChatMessage)) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            update(message);
        }
    }

    /// Clears all messages.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Replaces the contents wholesale, e.g. with a fetched history.
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// The messages in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
