//! The interpreter for one streaming turn.
//!
//! [`TurnState`] is a pure reducer over [`ProtocolEvent`]s: no IO, no
//! clock, just (state, event) -> state. The session controller mirrors
//! each event into the conversation store and renderer as it applies it
//! here; keeping the reducer pure makes the state machine testable
//! without a transport.

use crate::types::{ProtocolEvent, SessionStatus, Source};

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The backend finished the turn with a `done` frame.
    Completed {
        /// New thread title, if the backend renamed the thread.
        thread_title: Option<String>,
    },
    /// The backend reported an error, or the transport failed.
    Failed {
        /// The failure message.
        message: String,
    },
    /// The stream was cancelled before a terminal frame arrived.
    ///
    /// Only the session controller produces this; the reducer never
    /// does.
    Interrupted,
}

/// Accumulated state for one in-flight turn.
///
/// Status transitions follow the backend's phases (thinking, then any
/// number of retrieving/searching updates, then generating) but nothing
/// is validated against that order; the status is a display value.
/// Once an outcome is set the turn is finished and every further event
/// is ignored.
#[derive(Debug, Default)]
pub struct TurnState {
    status: Option<SessionStatus>,
    content: String,
    sources: Vec<Source>,
    outcome: Option<TurnOutcome>,
}

impl TurnState {
    /// Creates an empty turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event.
    ///
    /// Chunks append in application order; a sources event replaces the
    /// working source set rather than merging into it.
    pub fn apply(&mut self, event: ProtocolEvent) {
        if self.outcome.is_some() {
            return;
        }
        match event {
            ProtocolEvent::Status(status) => {
                self.status = Some(status);
            }
            ProtocolEvent::Sources(sources) => {
                self.sources = sources;
            }
            ProtocolEvent::Chunk(text) => {
                self.content.push_str(&text);
            }
            ProtocolEvent::Done { thread_title } => {
                self.outcome = Some(TurnOutcome::Completed { thread_title });
            }
            ProtocolEvent::Error { message } => {
                self.outcome = Some(TurnOutcome::Failed { message });
            }
        }
    }

    /// Returns true once a terminal event has been applied.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The most recent status update, if any.
    pub fn status(&self) -> Option<&SessionStatus> {
        self.status.as_ref()
    }

    /// The accumulated assistant content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The working source set.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The terminal outcome, if the turn has finished.
    pub fn outcome(&self) -> Option<&TurnOutcome> {
        self.outcome.as_ref()
    }

    /// Consumes the turn, returning its outcome if it finished.
    pub fn into_outcome(self) -> Option<TurnOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamFrame;

    fn chunk(text: &str) -> ProtocolEvent {
        ProtocolEvent::Chunk(text.to_string())
    }

    fn done(title: Option<&str>) -> ProtocolEvent {
        ProtocolEvent::Done {
            thread_title: title.map(String::from),
        }
    }

    #[test]
    fn content_is_ordered_concatenation_of_chunks() {
        let mut turn = TurnState::new();
        turn.apply(ProtocolEvent::Status(SessionStatus::Thinking));
        turn.apply(chunk("Hi"));
        turn.apply(ProtocolEvent::Sources(vec![Source::web("t", "u", "s")]));
        turn.apply(ProtocolEvent::Status(SessionStatus::Generating));
        turn.apply(chunk(" there"));
        turn.apply(done(None));

        assert_eq!(turn.content(), "Hi there");
        assert!(turn.is_finished());
    }

    #[test]
    fn status_tracks_latest_update() {
        let mut turn = TurnState::new();
        assert!(turn.status().is_none());
        turn.apply(ProtocolEvent::Status(SessionStatus::Thinking));
        assert_eq!(turn.status(), Some(&SessionStatus::Thinking));
        turn.apply(ProtocolEvent::Status(SessionStatus::Retrieving));
        turn.apply(ProtocolEvent::Status(SessionStatus::Searching));
        turn.apply(ProtocolEvent::Status(SessionStatus::Generating));
        assert_eq!(turn.status(), Some(&SessionStatus::Generating));
    }

    #[test]
    fn unrecognized_status_tolerated() {
        let mut turn = TurnState::new();
        turn.apply(ProtocolEvent::Status(SessionStatus::Other(
            "reranking".to_string(),
        )));
        assert_eq!(turn.status().unwrap().as_str(), "reranking");
    }

    #[test]
    fn sources_replace_not_merge() {
        let mut turn = TurnState::new();
        turn.apply(ProtocolEvent::Sources(vec![
            Source::web("a", "ua", "sa"),
            Source::web("b", "ub", "sb"),
        ]));
        turn.apply(ProtocolEvent::Sources(vec![Source::document("c", "text")]));
        assert_eq!(turn.sources().len(), 1);
        assert_eq!(turn.sources()[0].title, "c");
    }

    #[test]
    fn done_captures_thread_title() {
        let mut turn = TurnState::new();
        turn.apply(done(Some("Hello")));
        assert_eq!(
            turn.into_outcome(),
            Some(TurnOutcome::Completed {
                thread_title: Some("Hello".to_string())
            })
        );
    }

    #[test]
    fn error_after_chunks_keeps_content() {
        let mut turn = TurnState::new();
        turn.apply(chunk("partial"));
        turn.apply(ProtocolEvent::Error {
            message: "backend failed".to_string(),
        });
        assert_eq!(turn.content(), "partial");
        assert_eq!(
            turn.outcome(),
            Some(&TurnOutcome::Failed {
                message: "backend failed".to_string()
            })
        );
    }

    #[test]
    fn events_after_terminal_are_ignored() {
        let mut turn = TurnState::new();
        turn.apply(chunk("final"));
        turn.apply(done(Some("Title")));
        turn.apply(chunk(" extra"));
        turn.apply(ProtocolEvent::Sources(vec![Source::web("t", "u", "s")]));
        turn.apply(ProtocolEvent::Error {
            message: "late".to_string(),
        });

        assert_eq!(turn.content(), "final");
        assert!(turn.sources().is_empty());
        assert_eq!(
            turn.outcome(),
            Some(&TurnOutcome::Completed {
                thread_title: Some("Title".to_string())
            })
        );
    }

    #[test]
    fn sources_apply_before_done_in_combined_frame() {
        let frame: StreamFrame = serde_json::from_str(
            r#"{"sources":[{"type":"web","title":"t","url":"u","snippet":"s"}],"done":true}"#,
        )
        .unwrap();
        let mut turn = TurnState::new();
        for event in frame.into_events() {
            turn.apply(event);
        }
        assert_eq!(turn.sources().len(), 1);
        assert!(matches!(
            turn.outcome(),
            Some(TurnOutcome::Completed { .. })
        ));
    }

    #[test]
    fn unfinished_turn_has_no_outcome() {
        let mut turn = TurnState::new();
        turn.apply(chunk("partial"));
        assert!(!turn.is_finished());
        assert_eq!(turn.into_outcome(), None);
    }
}
