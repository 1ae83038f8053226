use serde::{Deserialize, Serialize};

use crate::types::{SessionStatus, Source};

/// One decoded payload from the response stream's line framing.
///
/// A single frame may carry any subset of the optional fields; unknown
/// fields are ignored. [`StreamFrame::into_events`] turns the present
/// fields into [`ProtocolEvent`]s in the fixed application order
/// status, sources, chunk, done/error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamFrame {
    /// Display status update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,

    /// Replacement for the turn's working source set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,

    /// A fragment of assistant text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,

    /// True on the terminal frame of a successful turn.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,

    /// New thread title, present when this turn renamed the thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_title: Option<String>,

    /// Server-reported failure, terminal for the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A single interpretable event decoded from a [`StreamFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// Update the display status.
    Status(SessionStatus),
    /// Replace the turn's working source set.
    Sources(Vec<Source>),
    /// Append text to the active assistant message.
    Chunk(String),
    /// Finalize the turn successfully.
    Done {
        /// New thread title, if the backend renamed the thread.
        thread_title: Option<String>,
    },
    /// Finalize the turn with a server-reported failure.
    Error {
        /// The failure message from the server.
        message: String,
    },
}

impl StreamFrame {
    /// Returns true if this frame carries no interpretable fields.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.sources.is_none()
            && self.chunk.is_none()
            && !self.done
            && self.error.is_none()
    }

    /// Decomposes the frame into events in application order.
    ///
    /// `done` and `error` are mutually exclusive terminal signals; a
    /// frame carrying both yields only the error.
    pub fn into_events(self) -> Vec<ProtocolEvent> {
        let mut events = Vec::new();
        if let Some(status) = self.status {
            events.push(ProtocolEvent::Status(status));
        }
        if let Some(sources) = self.sources {
            events.push(ProtocolEvent::Sources(sources));
        }
        if let Some(chunk) = self.chunk {
            events.push(ProtocolEvent::Chunk(chunk));
        }
        if let Some(message) = self.error {
            events.push(ProtocolEvent::Error { message });
        } else if self.done {
            events.push(ProtocolEvent::Done {
                thread_title: self.thread_title,
            });
        }
        events
    }
}
