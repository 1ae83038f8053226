//! Line framing for streaming chat responses.
//!
//! This module turns the raw byte stream of a chat response into a
//! stream of decoded [`StreamFrame`]s. The wire format is line
//! oriented: only lines beginning with `data: ` carry a frame, and the
//! remainder of such a line is a JSON payload. Everything else
//! (keep-alives, blank separator lines) is skipped.
//!
//! Bytes are buffered until a full line is available before any text
//! decoding happens, so multi-byte UTF-8 sequences that straddle chunk
//! boundaries are never split. Payloads that fail to decode are dropped
//! without surfacing an event; the drop is recorded on a counter and
//! reported to the optional [`ClientLogger`].

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::client_logger::ClientLogger;
use crate::observability;
use crate::{Result, StreamFrame};

/// Marker prefix for lines that carry a frame payload.
const FRAME_MARKER: &[u8] = b"data: ";

/// Process a stream of bytes into a stream of decoded frames.
///
/// Transport failures pass through as fatal `Err` items; malformed
/// payloads do not appear in the output at all.
pub fn frame_stream<S>(
    byte_stream: S,
    logger: Option<Arc<dyn ClientLogger>>,
) -> impl Stream<Item = Result<StreamFrame>>
where
    S: Stream<Item = Result<Bytes>> + Unpin + 'static,
{
    let stream = byte_stream.fuse();
    let buffer = BytesMut::new();

    stream::unfold(
        (stream, buffer, logger),
        move |(mut stream, mut buffer, logger)| async move {
            loop {
                // Drain complete lines already buffered.
                while let Some(line) = next_line(&mut buffer) {
                    if let Some(frame) = decode_line(&line, logger.as_deref()) {
                        return Some((Ok(frame), (stream, buffer, logger)));
                    }
                }

                // Read more data.
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        observability::STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, logger)));
                    }
                    None => {
                        // End of stream; a trailing line may lack its newline.
                        if !buffer.is_empty() {
                            let line = buffer.split();
                            if let Some(frame) = decode_line(&line, logger.as_deref()) {
                                return Some((Ok(frame), (stream, buffer, logger)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Splits one complete line off the front of the buffer, stripping the
/// terminating `\n` and any preceding `\r`.
fn next_line(buffer: &mut BytesMut) -> Option<BytesMut> {
    let idx = buffer.iter().position(|&b| b == b'\n')?;
    let mut line = buffer.split_to(idx + 1);
    line.truncate(idx);
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    Some(line)
}

/// Decodes a single line into a frame.
///
/// Returns `None` both for lines that are not frame candidates and for
/// candidate payloads that fail to decode; only the latter count as
/// dropped.
fn decode_line(line: &[u8], logger: Option<&dyn ClientLogger>) -> Option<StreamFrame> {
    let payload = line.strip_prefix(FRAME_MARKER)?;

    let Ok(payload) = std::str::from_utf8(payload) else {
        observability::STREAM_DROPPED_FRAMES.click();
        if let Some(logger) = logger {
            logger.log_dropped_frame(&String::from_utf8_lossy(payload));
        }
        return None;
    };

    match serde_json::from_str::<StreamFrame>(payload) {
        Ok(frame) => {
            observability::STREAM_FRAMES.click();
            if let Some(logger) = logger {
                logger.log_frame(&frame);
            }
            Some(frame)
        }
        Err(_) => {
            observability::STREAM_DROPPED_FRAMES.click();
            if let Some(logger) = logger {
                logger.log_dropped_frame(payload);
            }
            None
        }
    }
}
