//! Message codec.
//!
//! Messages are JSON. On the streaming endpoint each message travels as one
//! server-push event: a `data: <json>` line followed by a blank line.

use crate::messages::{MediaUpdate, StreamErrorMessage};
use thiserror::Error;

/// MIME type of the server-push event format.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Failed to (de)serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The text is not a `data:` event frame.
    #[error("Malformed event frame")]
    MalformedFrame,
}

/// Encode a stream update payload.
pub fn encode_update(msg: &MediaUpdate) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(CodecError::from)
}

/// Encode the terminal error payload of a stream.
pub fn encode_stream_error(msg: &StreamErrorMessage) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(CodecError::from)
}

/// Extract the payload of a single event frame.
///
/// Lines that are not `data:` fields (comments, `event:`, `id:`) are skipped.
pub fn frame_payload(frame: &str) -> Result<String, CodecError> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data.is_empty() {
        return Err(CodecError::MalformedFrame);
    }
    Ok(data.join("\n"))
}

/// Decode a stream update from an event frame.
pub fn decode_update_frame(frame: &str) -> Result<MediaUpdate, CodecError> {
    let payload = frame_payload(frame)?;
    serde_json::from_str(&payload).map_err(CodecError::from)
}
