// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod store;
pub mod turn;
pub mod types;
pub mod utils;

// Re-exports
pub use client::Client;
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use render::{PlainTextRenderer, Renderer};
pub use store::ConversationStore;
pub use turn::{TurnOutcome, TurnState};
pub use types::*;
