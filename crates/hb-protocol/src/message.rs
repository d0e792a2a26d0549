//! Chat events carried over the streaming connection
//!
//! Inbound and outbound traffic share one shape. The platform pushes many
//! event types (`hello`, `user_typing`, send acknowledgements without a
//! type at all), so every field falls back to its default when absent.
//!
//! # Sequence numbers
//!
//! `id` is only meaningful on outbound events: the platform uses it to
//! correlate its acknowledgement with the frame we sent. It starts at 1 and
//! is never reused within a process. Inbound events decode with `id == 0`,
//! and an id of zero is omitted when encoding.

use serde::{Deserialize, Serialize};

/// Event kind carried by user-authored chat messages.
pub const MESSAGE_KIND: &str = "message";

/// A single chat event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEvent {
    /// Outbound sequence number (zero on inbound events)
    #[serde(skip_serializing_if = "is_unset")]
    pub id: u64,
    /// Event kind, e.g. "message"
    #[serde(rename = "type")]
    pub kind: String,
    /// Channel identifier
    pub channel: String,
    /// Sender identity
    pub user: String,
    /// Text body
    pub text: String,
}

impl ChatEvent {
    /// Create an outbound chat message for a channel.
    ///
    /// The sequence number is assigned when the event is sent.
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind: MESSAGE_KIND.to_string(),
            channel: channel.into(),
            user: String::new(),
            text: text.into(),
        }
    }

    /// Whether this event is a chat message
    pub fn is_message(&self) -> bool {
        self.kind == MESSAGE_KIND
    }

    /// Whether this event was authored by the given identity
    pub fn is_from(&self, user: &str) -> bool {
        self.user == user
    }

    /// Build the reply to this event: same channel, new text
    pub fn reply(&self, text: impl Into<String>) -> Self {
        Self::message(self.channel.clone(), text)
    }
}

fn is_unset(id: &u64) -> bool {
    *id == 0
}
