use serde::{Deserialize, Serialize};

use crate::types::Source;

/// Parameters for a chat turn, streaming or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// The thread the message belongs to.
    pub thread_id: String,

    /// Whether the backend should run a web search for context.
    pub enable_web_search: bool,

    /// Whether the backend should retrieve document context.
    pub enable_rag: bool,
}

impl ChatRequest {
    /// Creates a request with the default toggles: retrieval on, web
    /// search off.
    pub fn new(message: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: thread_id.into(),
            enable_web_search: false,
            enable_rag: true,
        }
    }

    /// Sets whether web search is enabled.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.enable_web_search = enabled;
        self
    }

    /// Sets whether document retrieval is enabled.
    pub fn with_rag(mut self, enabled: bool) -> Self {
        self.enable_rag = enabled;
        self
    }
}

/// The response from the non-streaming chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// The complete assistant reply.
    pub message: String,

    /// Citation sources used for the reply.
    #[serde(default)]
    pub sources: Vec<Source>,

    /// The thread the reply was saved to.
    pub thread_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toggles() {
        let request = ChatRequest::new("hi", "t-1");
        assert!(!request.enable_web_search);
        assert!(request.enable_rag);
    }

    #[test]
    fn builder_toggles() {
        let request = ChatRequest::new("hi", "t-1")
            .with_web_search(true)
            .with_rag(false);
        assert!(request.enable_web_search);
        assert!(!request.enable_rag);
    }

    #[test]
    fn request_serialization() {
        let request = ChatRequest::new("hi", "t-1");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"message":"hi","thread_id":"t-1","enable_web_search":false,"enable_rag":true}"#
        );
    }

    #[test]
    fn response_defaults_sources() {
        let json = r#"{"message":"answer","thread_id":"t-1"}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.sources.is_empty());
    }
}
