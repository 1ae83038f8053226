use serde::{Deserialize, Serialize};

/// Where a citation source came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A web search result.
    Web,
    /// A chunk retrieved from an uploaded document.
    Document,
}

/// A citation source attached to an assistant message.
///
/// Web sources carry a title, URL, and snippet; document sources carry
/// the retrieved chunk in `content` and name the originating file in the
/// wire field `source`, which is accepted as an alias for `title`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    /// The kind of source, `web` or `document`.
    #[serde(rename = "type")]
    pub kind: SourceKind,

    /// Display title for the source.
    #[serde(default, alias = "source")]
    pub title: String,

    /// Link to the source, present for web results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Short excerpt for display.
    #[serde(default)]
    pub snippet: String,

    /// Full retrieved content, present for document chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Source {
    /// Creates a new web source.
    pub fn web(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Web,
            title: title.into(),
            url: Some(url.into()),
            snippet: snippet.into(),
            content: None,
        }
    }

    /// Creates a new document source.
    pub fn document(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Document,
            title: title.into(),
            url: None,
            snippet: String::new(),
            content: Some(content.into()),
        }
    }

    /// Returns a short excerpt for display: the snippet when present,
    /// otherwise the content truncated to `max_len` characters.
    pub fn excerpt(&self, max_len: usize) -> String {
        if !self.snippet.is_empty() {
            return self.snippet.clone();
        }
        let Some(content) = &self.content else {
            return String::new();
        };
        if content.chars().count() <= max_len {
            content.clone()
        } else {
            let truncated: String = content.chars().take(max_len).collect();
            format!("{truncated}...")
        }
    }
}
