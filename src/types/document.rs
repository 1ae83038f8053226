use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An uploaded document as returned by the document endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier assigned by the backend.
    pub id: String,

    /// Original file name.
    pub filename: String,

    /// File type, e.g. `pdf` or `txt`.
    pub file_type: String,

    /// Number of retrieval chunks the document was split into.
    pub chunk_count: u32,

    /// When the document was uploaded.
    #[serde(with = "crate::utils::time")]
    pub uploaded_at: OffsetDateTime,

    /// True once the document has been indexed for retrieval.
    pub processed: bool,
}
