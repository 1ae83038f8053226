//! Logging trait for client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture every request, decoded frame, and dropped frame passing
//! through a [`Client`](crate::Client). Dropped frames are otherwise
//! invisible: the transport skips them without surfacing an event.

use crate::{ChatRequest, ChatResponse, StreamFrame};

/// A trait for logging client operations.
///
/// Implement this trait to record wire traffic for debugging or audit.
///
/// # Example
///
/// ```rust,ignore
/// use cicero::{ChatRequest, ChatResponse, ClientLogger, StreamFrame};
/// use std::sync::Mutex;
/// use std::io::Write;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &ChatRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &ChatResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_frame(&self, frame: &StreamFrame) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "frame: {}", serde_json::to_string(frame).unwrap()).unwrap();
///     }
///
///     fn log_dropped_frame(&self, payload: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "dropped: {payload}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing chat request, streaming or not.
    fn log_request(&self, request: &ChatRequest);

    /// Log a complete response from a non-streaming chat call.
    fn log_response(&self, response: &ChatResponse);

    /// Log an individual decoded frame from a streaming response.
    fn log_frame(&self, frame: &StreamFrame);

    /// Log a `data:` payload that failed to decode and was skipped.
    ///
    /// Called at most once per malformed line; the payload is passed
    /// verbatim (lossily converted when it was not valid UTF-8).
    fn log_dropped_frame(&self, payload: &str);
}
