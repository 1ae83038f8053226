//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and
//! configuration structures for controlling chat behavior.

use arrrg_derive::CommandLine;

/// Command-line arguments for the cicero-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: http://127.0.0.1:8000/api/)", "URL")]
    pub base_url: Option<String>,

    /// Thread to resume on startup.
    #[arrrg(optional, "Thread id to resume", "THREAD")]
    pub thread: Option<String>,

    /// Enable web search context for messages.
    #[arrrg(flag, "Enable web search for context gathering")]
    pub web_search: bool,

    /// Disable document retrieval context.
    #[arrrg(flag, "Disable document retrieval")]
    pub no_rag: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Backend base URL override; `None` lets the client resolve it.
    pub base_url: Option<String>,

    /// Thread to resume on startup, if any.
    pub thread_id: Option<String>,

    /// Whether the backend should run a web search per message.
    pub enable_web_search: bool,

    /// Whether the backend should retrieve document context per message.
    pub enable_rag: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Retrieval: enabled
    /// - Web search: disabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            thread_id: None,
            enable_web_search: false,
            enable_rag: true,
            use_color: true,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the thread to resume.
    pub fn with_thread(mut self, thread_id: String) -> Self {
        self.thread_id = Some(thread_id);
        self
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

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            base_url: args.base_url,
            thread_id: args.thread,
            enable_web_search: args.web_search,
            enable_rag: !args.no_rag,
            use_color: !args.no_color,
        }
    }
}
