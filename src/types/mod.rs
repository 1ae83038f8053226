// Public modules
pub mod chat_request;
pub mod document;
pub mod message;
pub mod message_record;
pub mod source;
pub mod status;
pub mod stream_frame;
pub mod thread;

// Re-exports
pub use chat_request::{ChatRequest, ChatResponse};
pub use document::Document;
pub use message::{ChatMessage, MessageRole};
pub use message_record::MessageRecord;
pub use source::{Source, SourceKind};
pub use status::SessionStatus;
pub use stream_frame::{ProtocolEvent, StreamFrame};
pub use thread::Thread;
