//! JSON codec for chat event frames
//!
//! The streaming transport is message-framed, so one frame always carries
//! exactly one complete JSON document.

use crate::error::WireError;
use crate::message::ChatEvent;

/// Encode an event as the text payload of a single frame
pub fn encode_event(event: &ChatEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode an event from a text frame payload
pub fn decode_event(text: &str) -> Result<ChatEvent, WireError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode an event from a binary frame payload
pub fn decode_event_slice(data: &[u8]) -> Result<ChatEvent, WireError> {
    let text = std::str::from_utf8(data).map_err(|_| WireError::NonUtf8Frame)?;
    decode_event(text)
}
