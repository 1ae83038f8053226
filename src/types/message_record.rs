use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{ChatMessage, MessageRole, Source};

/// A persisted message as returned by `GET threads/{id}/messages`.
///
/// The backend stores citation sources as a JSON-encoded string column;
/// conversion into [`ChatMessage`] decodes it, degrading to an empty
/// list when the stored value does not parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRecord {
    /// Identifier assigned by the backend.
    pub id: String,

    /// The thread this message belongs to.
    pub thread_id: String,

    /// Who authored the message.
    pub role: MessageRole,

    /// The message text.
    pub content: String,

    /// JSON-encoded citation sources, if any were attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl From<MessageRecord> for ChatMessage {
    fn from(record: MessageRecord) -> Self {
        let sources = record
            .sources
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<Source>>(s).ok())
            .unwrap_or_default();
        ChatMessage {
            id: record.id,
            role: record.role,
            content: record.content,
            created_at: record.created_at,
            is_streaming: false,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn record(sources: Option<&str>) -> MessageRecord {
        MessageRecord {
            id: "m-1".to_string(),
            thread_id: "t-1".to_string(),
            role: MessageRole::Assistant,
            content: "answer".to_string(),
            sources: sources.map(String::from),
            created_at: datetime!(2024-05-01 12:00 UTC),
        }
    }

    #[test]
    fn deserializes_wire_record() {
        let json = r#"{
            "id": "m-1",
            "thread_id": "t-1",
            "role": "assistant",
            "content": "answer",
            "sources": null,
            "created_at": "2024-05-01T12:00:00Z"
        }"#;
        let parsed: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, record(None));
    }

    #[test]
    fn conversion_decodes_sources() {
        let encoded = r#"[{"type":"web","title":"t","url":"u","snippet":"s"}]"#;
        let msg: ChatMessage = record(Some(encoded)).into();
        assert_eq!(msg.sources.len(), 1);
        assert_eq!(msg.sources[0].title, "t");
        assert!(!msg.is_streaming);
    }

    #[test]
    fn conversion_tolerates_bad_sources() {
        let msg: ChatMessage = record(Some("not json")).into();
        assert!(msg.sources.is_empty());
    }
}
