//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the
//! conversation history for the active thread and drives one streaming
//! turn at a time from optimistic insert through finalization.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::Client;
use crate::chat::config::ChatConfig;
use crate::error::Result;
use crate::observability;
use crate::render::Renderer;
use crate::store::ConversationStore;
use crate::turn::{TurnOutcome, TurnState};
use crate::types::{ChatMessage, ChatRequest, ProtocolEvent, SessionStatus, Source};

/// Content substituted for the assistant message when a turn fails.
pub const FAILED_RESPONSE_TEXT: &str = "Error: Failed to get response";

/// A chat session that manages conversation state and drives streaming
/// turns.
///
/// The session owns all turn-local state (active message content, the
/// display status, the working source set) and mutates it only through
/// `&mut self`, so a second in-flight `send_message` on the same
/// session cannot exist.
pub struct ChatSession {
    client: Client,
    config: ChatConfig,
    store: ConversationStore,
    status: Option<SessionStatus>,
    is_loading: bool,
    sources: Vec<Source>,
    last_outcome: Option<TurnOutcome>,
    turn_count: u64,
    failure_count: u64,
    local_seq: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The number of messages in the conversation view.
    pub message_count: usize,
    /// Turns started in this session.
    pub turn_count: u64,
    /// Turns that ended in failure.
    pub failure_count: u64,
    /// Whether web search is enabled for new messages.
    pub enable_web_search: bool,
    /// Whether document retrieval is enabled for new messages.
    pub enable_rag: bool,
    /// The backend base URL in use.
    pub base_url: String,
}

impl ChatSession {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(client: Client, config: ChatConfig) -> Self {
        Self {
            client,
            config,
            store: ConversationStore::new(),
            status: None,
            is_loading: false,
            sources: Vec::new(),
            last_outcome: None,
            turn_count: 0,
            failure_count: 0,
            local_seq: 0,
        }
    }

    /// Sends a user message and streams the response into the
    /// conversation.
    ///
    /// This method:
    /// 1. Appends the user message and an empty assistant placeholder
    /// 2. Opens the streaming request
    /// 3. Applies each decoded frame to the conversation and renderer
    /// 4. Finalizes the placeholder on done, error, or transport failure
    ///
    /// Empty input (after trimming) is a no-op. Every failure after the
    /// optimistic insert is absorbed here: the placeholder's content is
    /// replaced with a fixed failure text and nothing is retried.
    /// Returns the new thread title when this turn renamed the thread.
    pub async fn send_message(
        &mut self,
        text: &str,
        thread_id: &str,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        observability::SESSION_TURNS.click();
        self.turn_count += 1;
        self.is_loading = true;
        self.status = Some(SessionStatus::Thinking);
        self.sources.clear();
        self.last_outcome = None;

        let user_id = self.next_message_id();
        self.store.append(ChatMessage::user(user_id, text));
        let assistant_id = self.next_message_id();
        self.store
            .append(ChatMessage::streaming_placeholder(assistant_id.clone()));

        let request = ChatRequest::new(text, thread_id)
            .with_web_search(self.config.enable_web_search)
            .with_rag(self.config.enable_rag);

        let outcome = self
            .run_turn(&request, &assistant_id, renderer, interrupted)
            .await;

        let thread_title = match &outcome {
            TurnOutcome::Completed { thread_title } => thread_title.clone(),
            TurnOutcome::Failed { message } => {
                observability::SESSION_TURN_FAILURES.click();
                self.failure_count += 1;
                renderer.print_error(message);
                self.store.update_by_id(&assistant_id, |msg| {
                    msg.content = FAILED_RESPONSE_TEXT.to_string();
                    msg.is_streaming = false;
                });
                None
            }
            TurnOutcome::Interrupted => {
                observability::SESSION_TURN_INTERRUPTS.click();
                renderer.print_interrupted();
                self.store
                    .update_by_id(&assistant_id, |msg| msg.is_streaming = false);
                None
            }
        };
        self.last_outcome = Some(outcome);

        // Every exit path above converges here.
        self.is_loading = false;
        self.status = None;
        renderer.finish_response();

        thread_title
    }

    /// Drives one turn's frame stream to a terminal outcome.
    ///
    /// Frames are consumed one at a time and their events applied in
    /// arrival order; there is no buffering between the transport and
    /// the conversation.
    async fn run_turn(
        &mut self,
        request: &ChatRequest,
        assistant_id: &str,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> TurnOutcome {
        let mut stream = match self.client.stream_chat(request).await {
            Ok(stream) => stream,
            Err(err) => {
                return TurnOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };

        let mut turn = TurnState::new();
        while let Some(item) = stream.next().await {
            if interrupted.load(Ordering::Relaxed) {
                return TurnOutcome::Interrupted;
            }
            let frame = match item {
                Ok(frame) => frame,
                Err(err) => {
                    return TurnOutcome::Failed {
                        message: err.to_string(),
                    };
                }
            };
            for event in frame.into_events() {
                self.observe_event(&event, assistant_id, renderer);
                turn.apply(event);
            }
            if turn.is_finished() {
                break;
            }
        }

        // A stream that closes without done/error left a truncated
        // response; report it as a failure rather than leaving the
        // partial text looking complete.
        match turn.into_outcome() {
            Some(outcome) => outcome,
            None => TurnOutcome::Failed {
                message: "stream closed before a terminal frame".to_string(),
            },
        }
    }

    /// Mirrors one interpreted event into the conversation, session
    /// state, and renderer.
    fn observe_event(
        &mut self,
        event: &ProtocolEvent,
        assistant_id: &str,
        renderer: &mut dyn Renderer,
    ) {
        match event {
            ProtocolEvent::Status(status) => {
                self.status = Some(status.clone());
                renderer.print_status(status);
            }
            ProtocolEvent::Sources(sources) => {
                self.sources = sources.clone();
                renderer.print_sources(sources);
            }
            ProtocolEvent::Chunk(text) => {
                self.store
                    .update_by_id(assistant_id, |msg| msg.content.push_str(text));
                renderer.print_text(text);
            }
            ProtocolEvent::Done { .. } => {
                let sources = self.sources.clone();
                self.store.update_by_id(assistant_id, |msg| {
                    msg.is_streaming = false;
                    msg.sources = sources;
                });
            }
            // Failure finalization happens at the outcome level.
            ProtocolEvent::Error { .. } => {}
        }
    }

    /// Replaces the conversation view with a thread's persisted history.
    pub async fn load_messages(&mut self, thread_id: &str) -> Result<()> {
        let records = self.client.list_messages(thread_id).await?;
        self.store
            .replace(records.into_iter().map(ChatMessage::from).collect());
        self.sources.clear();
        Ok(())
    }

    /// Clears the conversation view and the last turn's sources.
    pub fn clear_messages(&mut self) {
        self.store.reset();
        self.sources.clear();
    }

    /// The messages in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    /// The number of messages in the conversation view.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// True while a turn is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The current display status, if a turn is in flight.
    pub fn status(&self) -> Option<&SessionStatus> {
        self.status.as_ref()
    }

    /// The citation sources from the most recent turn.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// How the most recent turn ended, if one has run.
    pub fn last_outcome(&self) -> Option<&TurnOutcome> {
        self.last_outcome.as_ref()
    }

    /// Sets whether web search is enabled for new messages.
    pub fn set_web_search(&mut self, enabled: bool) {
        self.config.enable_web_search = enabled;
    }

    /// Returns whether web search is enabled for new messages.
    pub fn web_search_enabled(&self) -> bool {
        self.config.enable_web_search
    }

    /// Sets whether document retrieval is enabled for new messages.
    pub fn set_rag(&mut self, enabled: bool) {
        self.config.enable_rag = enabled;
    }

    /// Returns whether document retrieval is enabled for new messages.
    pub fn rag_enabled(&self) -> bool {
        self.config.enable_rag
    }

    /// The client this session talks through.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.message_count(),
            turn_count: self.turn_count,
            failure_count: self.failure_count,
            enable_web_search: self.config.enable_web_search,
            enable_rag: self.config.enable_rag,
            base_url: self.client.base_url().to_string(),
        }
    }

    /// Ids for optimistic inserts come from a session-local counter, so
    /// two rapid sends can never collide.
    fn next_message_id(&mut self) -> String {
        self.local_seq += 1;
        format!("local-{}", self.local_seq)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::types::MessageRole;

    /// Renderer that records everything it is told.
    #[derive(Default)]
    struct RecordingRenderer {
        texts: Vec<String>,
        statuses: Vec<String>,
        sources_seen: usize,
        errors: Vec<String>,
        infos: Vec<String>,
        finished: usize,
        interrupted: usize,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, text: &str) {
            self.texts.push(text.to_string());
        }
        fn print_status(&mut self, status: &SessionStatus) {
            self.statuses.push(status.to_string());
        }
        fn print_sources(&mut self, sources: &[Source]) {
            self.sources_seen += sources.len();
        }
        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }
        fn print_info(&mut self, info: &str) {
            self.infos.push(info.to_string());
        }
        fn finish_response(&mut self) {
            self.finished += 1;
        }
        fn print_interrupted(&mut self) {
            self.interrupted += 1;
        }
    }

    /// Serves exactly one canned HTTP response on a fresh port.
    ///
    /// When `declared_len` exceeds the body length the connection is
    /// closed early, which the client sees as a mid-stream transport
    /// failure.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
        declared_len: Option<usize>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let length = declared_len.unwrap_or(body.len());
            let response = format!(
                "{status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {length}\r\nconnection: close\r\n\r\n{body}"
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/api/", addr)
    }

    /// Reads the request head plus content-length bytes of body.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + body_len {
                    return;
                }
            }
        }
    }

    fn session_for(base_url: String) -> ChatSession {
        let client = Client::new(Some(base_url)).unwrap();
        ChatSession::new(client, ChatConfig::new())
    }

    fn not_interrupted() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[tokio::test]
    async fn empty_message_is_a_noop() {
        let mut session = session_for("http://127.0.0.1:9/api/".to_string());
        let mut renderer = RecordingRenderer::default();
        let title = session
            .send_message("   ", "t-1", &mut renderer, not_interrupted())
            .await;
        assert_eq!(title, None);
        assert_eq!(session.message_count(), 0);
        assert!(!session.is_loading());
        assert!(session.last_outcome().is_none());
    }

    #[tokio::test]
    async fn streams_chunks_and_returns_title() {
        let body = "data: {\"status\":\"thinking\"}\n\n\
                    data: {\"status\":\"generating\"}\n\n\
                    data: {\"chunk\":\"Hi\"}\n\n\
                    data: {\"chunk\":\" there\"}\n\n\
                    data: {\"done\":true,\"thread_title\":\"Hello\"}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        let title = session
            .send_message("Hello", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(title.as_deref(), Some("Hello"));
        assert_eq!(session.message_count(), 2);
        let messages = session.messages();
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hi there");
        assert!(!messages[1].is_streaming);
        assert_eq!(renderer.statuses, vec!["thinking", "generating"]);
        assert_eq!(renderer.texts.concat(), "Hi there");
        assert!(!session.is_loading());
        assert!(session.status().is_none());
        assert_eq!(renderer.finished, 1);
    }

    #[tokio::test]
    async fn done_without_title_returns_none() {
        let body = "data: {\"chunk\":\"ok\"}\n\ndata: {\"done\":true}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        let title = session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(title, None);
        assert_eq!(
            session.last_outcome(),
            Some(&TurnOutcome::Completed { thread_title: None })
        );
    }

    #[tokio::test]
    async fn attaches_sources_on_done() {
        let body = "data: {\"sources\":[{\"type\":\"web\",\"title\":\"t\",\"url\":\"u\",\"snippet\":\"s\"}]}\n\n\
                    data: {\"chunk\":\"cited\"}\n\n\
                    data: {\"done\":true}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        let assistant = &session.messages()[1];
        assert_eq!(assistant.sources.len(), 1);
        assert_eq!(assistant.sources[0].title, "t");
        assert_eq!(session.sources().len(), 1);
        assert_eq!(renderer.sources_seen, 1);
    }

    #[tokio::test]
    async fn error_frame_yields_failure_marker() {
        let body = "data: {\"chunk\":\"partial\"}\n\ndata: {\"error\":\"backend exploded\"}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        let title = session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(title, None);
        let assistant = &session.messages()[1];
        assert_eq!(assistant.content, FAILED_RESPONSE_TEXT);
        assert!(!assistant.is_streaming);
        assert!(!session.is_loading());
        assert_eq!(renderer.errors, vec!["backend exploded".to_string()]);
        assert!(matches!(
            session.last_outcome(),
            Some(TurnOutcome::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn transport_failure_mid_stream_yields_failure_marker() {
        let body = "data: {\"chunk\":\"partial\"}\n\n";
        // Declare more bytes than are sent so the closed connection is
        // a mid-stream failure instead of a clean end.
        let base_url = serve_once(
            "HTTP/1.1 200 OK",
            "text/event-stream",
            body,
            Some(body.len() + 64),
        )
        .await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        let title = session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(title, None);
        let assistant = &session.messages()[1];
        assert_eq!(assistant.content, FAILED_RESPONSE_TEXT);
        assert!(!assistant.is_streaming);
        assert!(!session.is_loading());
        assert_eq!(renderer.errors.len(), 1);
    }

    #[tokio::test]
    async fn clean_close_without_done_is_a_failure() {
        let body = "data: {\"chunk\":\"partial\"}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(session.messages()[1].content, FAILED_RESPONSE_TEXT);
        assert!(matches!(
            session.last_outcome(),
            Some(TurnOutcome::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped() {
        let body = "data: {\"chunk\":\"Hi\"}\n\
                    data: {truncated json\n\
                    data: {\"chunk\":\" there\"}\n\
                    data: {\"done\":true}\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(session.messages()[1].content, "Hi there");
        assert!(renderer.errors.is_empty());
    }

    #[tokio::test]
    async fn http_error_status_yields_failure_marker() {
        let base_url = serve_once(
            "HTTP/1.1 500 Internal Server Error",
            "application/json",
            "{\"detail\":\"llm down\"}",
            None,
        )
        .await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();

        let title = session
            .send_message("hi", "t-1", &mut renderer, not_interrupted())
            .await;

        assert_eq!(title, None);
        assert_eq!(session.messages()[1].content, FAILED_RESPONSE_TEXT);
        assert_eq!(renderer.errors.len(), 1);
        assert!(renderer.errors[0].contains("llm down"));
    }

    #[tokio::test]
    async fn interrupt_preserves_partial_content() {
        let body = "data: {\"chunk\":\"partial\"}\n\ndata: {\"done\":true}\n\n";
        let base_url = serve_once("HTTP/1.1 200 OK", "text/event-stream", body, None).await;
        let mut session = session_for(base_url);
        let mut renderer = RecordingRenderer::default();
        let interrupted = Arc::new(AtomicBool::new(true));

        let title = session
            .send_message("hi", "t-1", &mut renderer, interrupted)
            .await;

        assert_eq!(title, None);
        let assistant = &session.messages()[1];
        assert_ne!(assistant.content, FAILED_RESPONSE_TEXT);
        assert!(!assistant.is_streaming);
        assert_eq!(renderer.interrupted, 1);
        assert_eq!(session.last_outcome(), Some(&TurnOutcome::Interrupted));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn load_messages_replaces_history() {
        let body = r#"[
            {"id":"m-1","thread_id":"t-1","role":"user","content":"hi",
             "created_at":"2024-05-01T12:00:00Z"},
            {"id":"m-2","thread_id":"t-1","role":"assistant","content":"hello",
             "sources":"[{\"type\":\"web\",\"title\":\"t\",\"url\":\"u\",\"snippet\":\"s\"}]",
             "created_at":"2024-05-01T12:00:05Z"}
        ]"#;
        let base_url = serve_once("HTTP/1.1 200 OK", "application/json", body, None).await;
        let mut session = session_for(base_url);
        session.store.append(ChatMessage::user("stale", "old"));

        session.load_messages("t-1").await.unwrap();

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[0].content, "hi");
        assert_eq!(session.messages()[1].sources.len(), 1);
        assert!(!session.messages()[1].is_streaming);
    }

    #[tokio::test]
    async fn clear_messages_empties_view() {
        let mut session = session_for("http://127.0.0.1:9/api/".to_string());
        session.store.append(ChatMessage::user("1", "hi"));
        session.sources.push(Source::web("t", "u", "s"));

        session.clear_messages();

        assert_eq!(session.message_count(), 0);
        assert!(session.sources().is_empty());
    }

    #[test]
    fn message_ids_are_unique_and_monotonic() {
        let mut session = session_for("http://127.0.0.1:9/api/".to_string());
        let a = session.next_message_id();
        let b = session.next_message_id();
        let c = session.next_message_id();
        assert_eq!(a, "local-1");
        assert_eq!(b, "local-2");
        assert_eq!(c, "local-3");
    }

    #[test]
    fn toggles_round_trip() {
        let mut session = session_for("http://127.0.0.1:9/api/".to_string());
        assert!(session.rag_enabled());
        assert!(!session.web_search_enabled());
        session.set_web_search(true);
        session.set_rag(false);
        let stats = session.stats();
        assert!(stats.enable_web_search);
        assert!(!stats.enable_rag);
        assert_eq!(stats.turn_count, 0);
    }
}
