//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage threads, documents, and toggles without
//! sending messages to the backend.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the
/// backend as messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the local conversation view.
    Clear,

    /// List all threads.
    Threads,

    /// Switch to another thread and load its history.
    Switch(String),

    /// Create a new thread, optionally with a title.
    New(Option<String>),

    /// Delete a thread.
    DeleteThread(String),

    /// List uploaded documents.
    Documents,

    /// Upload a document for retrieval indexing.
    Upload(String),

    /// Delete an uploaded document.
    DeleteDocument(String),

    /// Toggle web search for subsequent messages.
    WebSearch(bool),

    /// Toggle document retrieval for subsequent messages.
    Rag(bool),

    /// Show the citation sources from the last turn.
    Sources,

    /// Display session statistics.
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command, or
/// `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use cicero::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/switch t-42").is_some());
/// assert!(parse_command("What is RAG?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "threads" => ChatCommand::Threads,
        "switch" => match argument {
            Some(id) => ChatCommand::Switch(id.to_string()),
            None => ChatCommand::Invalid("/switch requires a thread id".to_string()),
        },
        "new" => ChatCommand::New(argument.map(|s| s.to_string())),
        "delete" => match argument {
            Some(id) => ChatCommand::DeleteThread(id.to_string()),
            None => ChatCommand::Invalid("/delete requires a thread id".to_string()),
        },
        "docs" | "documents" => ChatCommand::Documents,
        "upload" => match argument {
            Some(path) => ChatCommand::Upload(path.to_string()),
            None => ChatCommand::Invalid("/upload requires a file path".to_string()),
        },
        "rmdoc" => match argument {
            Some(id) => ChatCommand::DeleteDocument(id.to_string()),
            None => ChatCommand::Invalid("/rmdoc requires a document id".to_string()),
        },
        "websearch" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::WebSearch(value),
            None => ChatCommand::Invalid("/websearch expects 'on' or 'off'".to_string()),
        },
        "rag" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Rag(value),
            None => ChatCommand::Invalid("/rag expects 'on' or 'off'".to_string()),
        },
        "sources" => ChatCommand::Sources,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /threads               List threads
  /switch <id>           Switch to a thread and load its history
  /new [title]           Create a new thread
  /delete <id>           Delete a thread
  /docs                  List uploaded documents
  /upload <file>         Upload a document for retrieval
  /rmdoc <id>            Delete an uploaded document
  /websearch on|off      Toggle web search context
  /rag on|off            Toggle document retrieval context
  /sources               Show sources from the last response
  /clear                 Clear the conversation view
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}
