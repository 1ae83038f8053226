use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A conversation thread as returned by the thread endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    /// Identifier assigned by the backend.
    pub id: String,

    /// Display title; backends may rename a thread after its first turn.
    pub title: String,

    /// When the thread was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// When the thread last changed.
    #[serde(with = "crate::utils::time")]
    pub updated_at: OffsetDateTime,
}
