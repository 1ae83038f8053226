use std::fmt;

use serde::{Deserialize, Serialize};

/// The display status reported while a turn is in flight.
///
/// The backend sends free-form status strings; the four named phases are
/// the ones it emits today. Anything else is preserved verbatim in
/// `Other` and displayed as-is rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    /// The backend accepted the request and is preparing a response.
    Thinking,
    /// Document retrieval is running.
    Retrieving,
    /// Web search is running.
    Searching,
    /// Tokens are being generated.
    Generating,
    /// An unrecognized status string, displayed verbatim.
    Other(String),
}

impl SessionStatus {
    /// Returns the wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Thinking => "thinking",
            SessionStatus::Retrieving => "retrieving",
            SessionStatus::Searching => "searching",
            SessionStatus::Generating => "generating",
            SessionStatus::Other(s) => s,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "thinking" => SessionStatus::Thinking,
            "retrieving" => SessionStatus::Retrieving,
            "searching" => SessionStatus::Searching,
            "generating" => SessionStatus::Generating,
            _ => SessionStatus::Other(s),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
